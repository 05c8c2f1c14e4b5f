//! # facade - Module-level facades for live instances
//!
//! `facade` lets a context object be driven through plain, free-standing
//! callables. A class is registered into one or more scopes; every public
//! method gets a facade there that forwards to whichever instance is currently
//! attached, with the method's exact calling convention. The crate also offers
//! a dispatch table resolving handlers by walking a value's class hierarchy.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use facade::prelude::*;
//! use std::sync::Arc;
//!
//! struct Operations;
//!
//! #[facade::class]
//! impl Operations {
//!     fn drop_table(&self, name: String, #[arg(default)] schema: Option<String>) -> String {
//!         format!("drop {}{name}", schema.map(|s| s + ".").unwrap_or_default())
//!     }
//! }
//!
//! let class = Operations::build_class()?;
//! let mut registry = ProxyRegistry::new();
//! let op = registry.create_scope("op");
//! registry.register_class(&class, op)?;
//!
//! registry.attach_instance(&Arc::new(Operations.into_instance(&class)));
//! let out = registry.call(op, "drop_table", Args::new().arg("account"))?;
//! ```
//!
//! ## Features
//!
//! - `macros` (default): the `#[facade::class]` attribute
//! - `tracing`: registry and dispatch logging through `tracing`

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use facade_core::{
    // Arguments
    Args,
    // Errors
    ArgumentTranslationError,
    // Translation
    ArgumentTranslator,
    BindError,
    BoundArguments,
    BoxError,
    CallError,
    // Object model
    Class,
    ClassBuilder,
    ClassError,
    ClassId,
    DispatchError,
    FacadeError,
    // Forwarding
    ForwardingPlan,
    // Values
    FromValue,
    InnerArg,
    Instance,
    IntoReturn,
    LegacyNames,
    Member,
    Method,
    MethodBody,
    // Signatures
    MethodSignature,
    OuterParams,
    Param,
    ProxyClass,
    RECEIVER,
    RegistryError,
    SignatureBuilder,
    Typed,
    Value,
    ValueError,
};

// Proxy registry
pub use facade_std::proxy::{ClassRegistration, Facade, ProxyOptions, ProxyRegistry, Scope, ScopeId};

// Dispatch
pub use facade_std::dispatch::{DEFAULT_QUALIFIER, DispatchTable, DynHandler};

#[cfg(feature = "macros")]
pub use facade_macros::class;

/// Proxy registry support module.
pub mod proxy {
    pub use facade_std::proxy::{
        ClassRegistration, Facade, ProxyOptions, ProxyRegistry, Scope, ScopeId,
    };
}

/// Type-hierarchy dispatch support module.
pub mod dispatch {
    pub use facade_std::dispatch::{DEFAULT_QUALIFIER, DispatchTable, DynHandler};
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use facade_std::testing::*;
}

/// Prelude module - common imports for facade.
///
/// # Usage
///
/// ```rust,ignore
/// use facade::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Arguments
        Args,
        // Errors
        CallError,
        // Object model
        Class,
        DispatchError,
        // Dispatch
        DispatchTable,
        FacadeError,
        Instance,
        LegacyNames,
        Method,
        MethodSignature,
        ProxyClass,
        // Proxy registry
        ProxyRegistry,
        ScopeId,
        Typed,
        Value,
    };
}
