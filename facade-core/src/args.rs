//! Call arguments, before and after binding to a signature.

use crate::{
    error::ValueError,
    value::{FromValue, Value},
};
use std::collections::BTreeMap;

/// The raw arguments of a call: positional values followed by keywords.
///
/// # Example
///
/// ```rust,ignore
/// let args = Args::new()
///     .arg("account")
///     .arg("balance")
///     .kwarg("schema", "public");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    positional: Vec<Value>,
    keywords: BTreeMap<String, Value>,
}

impl Args {
    /// Create an empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from positional values and keywords.
    pub fn from_parts(positional: Vec<Value>, keywords: BTreeMap<String, Value>) -> Self {
        Self {
            positional,
            keywords,
        }
    }

    /// Build from positional values only.
    pub fn positional_only<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            positional: values.into_iter().map(Into::into).collect(),
            keywords: BTreeMap::new(),
        }
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Set a keyword argument.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keywords.insert(name.into(), value.into());
        self
    }

    /// Positional values in call order.
    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    /// Keyword values.
    pub fn keywords(&self) -> &BTreeMap<String, Value> {
        &self.keywords
    }

    /// Split into positional values and keywords.
    pub fn into_parts(self) -> (Vec<Value>, BTreeMap<String, Value>) {
        (self.positional, self.keywords)
    }

    /// Total number of arguments.
    pub fn len(&self) -> usize {
        self.positional.len() + self.keywords.len()
    }

    /// Check if no arguments were supplied.
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keywords.is_empty()
    }
}

/// Arguments after binding to a [`MethodSignature`].
///
/// Every named parameter has exactly one value, either supplied or taken from
/// its default. Overflow lands in the variadic sinks.
///
/// [`MethodSignature`]: crate::MethodSignature
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArguments {
    params: Vec<(String, Value)>,
    varargs: Vec<Value>,
    varkw: BTreeMap<String, Value>,
}

impl BoundArguments {
    pub(crate) fn new(
        params: Vec<(String, Value)>,
        varargs: Vec<Value>,
        varkw: BTreeMap<String, Value>,
    ) -> Self {
        Self {
            params,
            varargs,
            varkw,
        }
    }

    /// Value bound to a named parameter.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.params
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, value)| value)
    }

    /// Extract a named parameter as a Rust type.
    pub fn extract<T: FromValue>(&self, name: &str) -> Result<T, ValueError> {
        let value = self
            .get(name)
            .cloned()
            .ok_or_else(|| ValueError::Missing(name.to_owned()))?;
        T::from_value(value)
    }

    /// Named parameters in declaration order.
    pub fn params(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.params.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Positional overflow collected by the variadic-positional parameter.
    pub fn varargs(&self) -> &[Value] {
        &self.varargs
    }

    /// Keyword overflow collected by the variadic-keyword parameter.
    pub fn varkw(&self) -> &BTreeMap<String, Value> {
        &self.varkw
    }
}
