//! Type-hierarchy dispatch.
//!
//! Maps `(class, qualifier)` pairs to handlers and resolves a handler for any
//! [`Typed`](facade_core::Typed) value through its ancestor chain.

pub mod table;

pub use table::{DEFAULT_QUALIFIER, DispatchTable, DynHandler};
