//! # facade-std
//!
//! Standard implementations for the facade framework.
//!
//! This crate provides:
//! - **Proxy registry**: [`ProxyRegistry`], [`Scope`], [`Facade`]
//! - **Type-hierarchy dispatch**: [`DispatchTable`]
//! - **Testing utilities**: [`testing::CallRecorder`]
//!
//! Enable the `tracing` feature to log registration, propagation, attach and
//! detach events through the `tracing` crate.
//!
//! [`ProxyRegistry`]: proxy::ProxyRegistry
//! [`Scope`]: proxy::Scope
//! [`Facade`]: proxy::Facade
//! [`DispatchTable`]: dispatch::DispatchTable

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core types
pub use facade_core;

// Modules
pub mod dispatch;
pub mod proxy;
pub mod testing;
