//! Dynamic values passed through facades and stored as attributes.
//!
//! - [`Value`] - the dynamically typed value itself
//! - [`FromValue`] - extraction of a Rust type out of a [`Value`]
//! - [`IntoReturn`] - conversion of a method body's output into a call result

use crate::error::{BoxError, ValueError};
use std::{collections::BTreeMap, fmt};

/// A dynamically typed value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// The absent value.
    #[default]
    None,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    Str(String),
    /// An ordered sequence of values.
    List(Vec<Value>),
    /// A mapping from string keys to values, ordered by key.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// The name of this value's type, as used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Returns `true` for [`Value::None`].
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Borrow the string content, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The integer content, if this is an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    fn mismatch(&self, expected: &'static str) -> ValueError {
        ValueError::Mismatch {
            expected,
            found: self.type_name(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("None"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Map(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k:?}: {v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::None
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::None, Into::into)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

/// Extracts a Rust value out of a dynamic [`Value`].
///
/// Used by generated method bodies to turn bound arguments back into the
/// parameter types of the Rust method they wrap.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be extracted from a `Value`",
    label = "missing `FromValue` implementation",
    note = "Implement `FromValue` for `{Self}` to use it as a method parameter."
)]
pub trait FromValue: Sized {
    /// Perform the extraction.
    fn from_value(value: Value) -> Result<Self, ValueError>;
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        Ok(value)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(other.mismatch("bool")),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Int(i) => Ok(i),
            other => Err(other.mismatch("int")),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Int(i) => i32::try_from(i).map_err(|_| ValueError::Mismatch {
                expected: "i32",
                found: "int",
            }),
            other => Err(other.mismatch("int")),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Float(x) => Ok(x),
            Value::Int(i) => Ok(i as f64),
            other => Err(other.mismatch("float")),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Str(s) => Ok(s),
            other => Err(other.mismatch("str")),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::None => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(other.mismatch("list")),
        }
    }
}

impl FromValue for BTreeMap<String, Value> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Map(map) => Ok(map),
            other => Err(other.mismatch("map")),
        }
    }
}

/// Trait for converting a method body's output into a call result.
///
/// # Default Implementations
///
/// - `()` → [`Value::None`]
/// - scalars, strings, [`Value`] → the corresponding value
/// - `Option<T>` → `None` or the inner conversion
/// - `Result<T, E>` → delegates to inner `T` or propagates the error
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an `IntoReturn`",
    label = "missing `IntoReturn` implementation",
    note = "Method bodies must return a type implementing `IntoReturn`."
)]
pub trait IntoReturn {
    /// Convert the output into a value or an error.
    fn into_return(self) -> Result<Value, BoxError>;
}

impl IntoReturn for Value {
    fn into_return(self) -> Result<Value, BoxError> {
        Ok(self)
    }
}

impl IntoReturn for () {
    fn into_return(self) -> Result<Value, BoxError> {
        Ok(Value::None)
    }
}

impl IntoReturn for bool {
    fn into_return(self) -> Result<Value, BoxError> {
        Ok(Value::Bool(self))
    }
}

impl IntoReturn for i64 {
    fn into_return(self) -> Result<Value, BoxError> {
        Ok(Value::Int(self))
    }
}

impl IntoReturn for i32 {
    fn into_return(self) -> Result<Value, BoxError> {
        Ok(Value::from(self))
    }
}

impl IntoReturn for usize {
    fn into_return(self) -> Result<Value, BoxError> {
        Ok(Value::Int(i64::try_from(self)?))
    }
}

impl IntoReturn for f64 {
    fn into_return(self) -> Result<Value, BoxError> {
        Ok(Value::Float(self))
    }
}

impl IntoReturn for String {
    fn into_return(self) -> Result<Value, BoxError> {
        Ok(Value::Str(self))
    }
}

impl IntoReturn for &'static str {
    fn into_return(self) -> Result<Value, BoxError> {
        Ok(Value::from(self))
    }
}

impl<T: Into<Value>> IntoReturn for Vec<T> {
    fn into_return(self) -> Result<Value, BoxError> {
        Ok(Value::from(self))
    }
}

impl<T: IntoReturn> IntoReturn for Option<T> {
    fn into_return(self) -> Result<Value, BoxError> {
        match self {
            Some(t) => t.into_return(),
            None => Ok(Value::None),
        }
    }
}

impl<T, E> IntoReturn for Result<T, E>
where
    T: IntoReturn,
    E: std::error::Error + Send + Sync + 'static,
{
    fn into_return(self) -> Result<Value, BoxError> {
        match self {
            Ok(t) => t.into_return(),
            Err(e) => Err(Box::new(e)),
        }
    }
}
