//! Testing utilities for facade.
//!
//! This module provides helpers for asserting what a forwarded call actually
//! delivered to the underlying method.
//!
//! # Features
//!
//! - [`CallRecorder`]: builds methods whose bodies record every call they receive
//! - [`RecordedCall`]: a snapshot of one call's bound arguments

use facade_core::{BoundArguments, Instance, Method, MethodSignature, Value};
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, PoisonError},
};

/// One call as seen by a recording method body.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Name of the method that was invoked.
    pub method: String,
    /// Class of the receiving instance.
    pub class: String,
    /// Named parameters after binding.
    pub params: BTreeMap<String, Value>,
    /// Variadic-positional overflow.
    pub varargs: Vec<Value>,
    /// Variadic-keyword overflow.
    pub varkw: BTreeMap<String, Value>,
}

impl RecordedCall {
    /// The bound value of a named parameter.
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }
}

/// Records the calls received by the methods it creates.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = CallRecorder::new();
/// let class = Class::builder("Operations")
///     .method("drop_table", recorder.method(signature))
///     .build()?;
///
/// // ... call through a facade ...
///
/// let call = recorder.last().unwrap();
/// assert_eq!(call.param("name"), Some(&Value::from("account")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallRecorder {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl CallRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// A method that records its call and returns [`Value::None`].
    pub fn method(&self, signature: MethodSignature) -> Method {
        self.returning(signature, Value::None)
    }

    /// A method that records its call and returns `value`.
    pub fn returning(&self, signature: MethodSignature, value: impl Into<Value>) -> Method {
        let calls = Arc::clone(&self.calls);
        let name = signature.name().to_owned();
        let value = value.into();
        Method::new(signature, move |instance: &Instance, bound: &BoundArguments| {
            calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(RecordedCall {
                    method: name.clone(),
                    class: instance.class().name().to_owned(),
                    params: bound
                        .params()
                        .map(|(k, v)| (k.to_owned(), v.clone()))
                        .collect(),
                    varargs: bound.varargs().to_vec(),
                    varkw: bound.varkw().clone(),
                });
            value.clone()
        })
    }

    /// All recorded calls, oldest first.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent call.
    pub fn last(&self) -> Option<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    /// Number of recorded calls.
    pub fn count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Forget all recorded calls.
    pub fn clear(&self) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
