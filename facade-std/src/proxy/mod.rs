//! Proxy registry support.
//!
//! This module exposes the methods of a live instance as facade callables
//! installed into named scopes.

pub mod facade;
pub mod registry;
pub mod scope;

pub use facade::Facade;
pub use registry::{ClassRegistration, ProxyOptions, ProxyRegistry};
pub use scope::{Scope, ScopeId};
