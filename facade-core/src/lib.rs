//! # facade-core
//!
//! Dynamic object model, signatures and errors for the facade framework.
//!
//! This crate has minimal dependencies and is designed to be imported by code
//! that declares classes without needing the registries in `facade-std`.
//!
//! # Building Blocks
//!
//! ## Values and Arguments
//!
//! [`Value`] is the dynamically typed currency of every call. A call carries
//! [`Args`] (positional values plus keywords); binding them to a signature
//! produces [`BoundArguments`].
//!
//! ## Signature Model ([`MethodSignature`])
//!
//! Ordered parameters with optional defaults, plus optional variadic sinks.
//! [`MethodSignature::bind`] is the single calling convention shared by direct
//! instance calls and facade calls.
//!
//! ## Forwarding ([`ForwardingPlan`])
//!
//! The parameter list a facade declares and the argument expression it uses to
//! re-issue the call against the real method.
//!
//! ## Argument Translation ([`ArgumentTranslator`])
//!
//! Rewrites legacy keyword names ([`LegacyNames`]) before a call is forwarded.
//!
//! ## Object Model ([`Class`], [`Instance`])
//!
//! Classes with multiple bases and a cached C3 ancestor chain; members are
//! methods or plain attributes.
//!
//! # Error Types
//!
//! - [`FacadeError`] - Top-level error type
//! - [`CallError`] - Facade and method invocation errors
//! - [`DispatchError`] - Type-hierarchy dispatch errors

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod args;
mod class;
mod error;
mod forward;
mod instance;
mod signature;
mod translate;
mod value;

// Re-exports
pub use args::{Args, BoundArguments};
pub use class::{Class, ClassBuilder, ClassId, Member, Method, MethodBody};
pub use error::{
    ArgumentTranslationError, BindError, BoxError, CallError, ClassError, DispatchError,
    FacadeError, RegistryError, ValueError,
};
pub use forward::{ForwardingPlan, InnerArg, OuterParams};
pub use instance::{Instance, ProxyClass, Typed};
pub use signature::{MethodSignature, Param, RECEIVER, SignatureBuilder};
pub use translate::{ArgumentTranslator, LegacyNames};
pub use value::{FromValue, IntoReturn, Value};
