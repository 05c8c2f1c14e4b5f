//! # Signature Model
//!
//! A [`MethodSignature`] describes the calling convention of a method: its
//! ordered named parameters (with optional defaults) and its optional
//! variadic-positional and variadic-keyword sinks.
//!
//! Signatures are captured once, when a method is declared, and are immutable
//! afterwards. Both the direct call on an instance and the call through a
//! facade bind their arguments with [`MethodSignature::bind`], so the two
//! observe exactly the same positional/keyword/default behavior.
//!
//! # Capture
//!
//! [`MethodSignature::capture`] drops an implicit receiver parameter named
//! `self` and validates the rest:
//!
//! - parameter names are unique
//! - defaulted parameters form a trailing segment
//!
//! The `#[facade::class]` attribute performs the same capture at compile time
//! from a Rust `fn` signature.

use crate::{
    args::{Args, BoundArguments},
    error::{BindError, ClassError},
    value::Value,
};
use std::{collections::BTreeMap, fmt};

/// Name of the implicit receiver parameter dropped by [`MethodSignature::capture`].
pub const RECEIVER: &str = "self";

/// A named parameter of a method.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    name: String,
    default: Option<Value>,
}

impl Param {
    /// A parameter that must be supplied by the caller.
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
        }
    }

    /// A parameter that falls back to `default` when omitted.
    pub fn optional(name: impl Into<String>, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            default: Some(default.into()),
        }
    }

    /// The parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The default value, if any.
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Whether the parameter has a default.
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

/// The captured calling convention of a method.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodSignature {
    name: String,
    params: Vec<Param>,
    varargs: Option<String>,
    varkw: Option<String>,
}

impl MethodSignature {
    /// Capture a signature from a declared parameter list.
    ///
    /// A leading parameter named [`RECEIVER`] is treated as the implicit
    /// receiver and dropped.
    pub fn capture(
        name: impl Into<String>,
        params: impl IntoIterator<Item = Param>,
        varargs: Option<&str>,
        varkw: Option<&str>,
    ) -> Result<Self, ClassError> {
        let name = name.into();
        let mut params: Vec<Param> = params.into_iter().collect();
        if params.first().is_some_and(|p| p.name == RECEIVER) {
            params.remove(0);
        }

        let invalid = |reason: String| ClassError::InvalidSignature {
            function: name.clone(),
            reason,
        };

        let mut seen_default = false;
        for (i, param) in params.iter().enumerate() {
            if param.has_default() {
                seen_default = true;
            } else if seen_default {
                return Err(invalid(format!(
                    "parameter '{}' without a default follows a defaulted parameter",
                    param.name
                )));
            }
            if params[..i].iter().any(|p| p.name == param.name) {
                return Err(invalid(format!("duplicate parameter '{}'", param.name)));
            }
        }
        for sink in [varargs, varkw].into_iter().flatten() {
            if params.iter().any(|p| p.name == sink) {
                return Err(invalid(format!("duplicate parameter '{sink}'")));
            }
        }
        if varargs.is_some() && varargs == varkw {
            return Err(invalid("variadic sinks share a name".to_owned()));
        }

        Ok(Self {
            name,
            params,
            varargs: varargs.map(str::to_owned),
            varkw: varkw.map(str::to_owned),
        })
    }

    /// Start building a signature parameter by parameter.
    pub fn builder(name: impl Into<String>) -> SignatureBuilder {
        SignatureBuilder {
            name: name.into(),
            params: Vec::new(),
            varargs: None,
            varkw: None,
        }
    }

    /// The method name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Named parameters in declaration order.
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Name of the variadic-positional parameter.
    pub fn varargs(&self) -> Option<&str> {
        self.varargs.as_deref()
    }

    /// Name of the variadic-keyword parameter.
    pub fn varkw(&self) -> Option<&str> {
        self.varkw.as_deref()
    }

    /// Parameters before the trailing defaulted segment.
    pub fn required_params(&self) -> impl Iterator<Item = &Param> {
        self.params.iter().take_while(|p| !p.has_default())
    }

    /// Bind call arguments to this signature.
    ///
    /// Positional arguments fill named parameters in order; keywords fill the
    /// parameter with the same name. Overflow goes to the variadic sinks when
    /// they exist. Unfilled parameters take their default.
    pub fn bind(&self, args: Args) -> Result<BoundArguments, BindError> {
        let (mut positional, keywords) = args.into_parts();
        let given = positional.len();

        let varargs = if given > self.params.len() {
            if self.varargs.is_none() {
                return Err(BindError::TooManyPositional {
                    function: self.name.clone(),
                    expected: self.params.len(),
                    given,
                });
            }
            positional.split_off(self.params.len())
        } else {
            Vec::new()
        };

        let mut slots: Vec<Option<Value>> = vec![None; self.params.len()];
        for (slot, value) in slots.iter_mut().zip(positional) {
            *slot = Some(value);
        }

        let mut varkw = BTreeMap::new();
        for (keyword, value) in keywords {
            match self.params.iter().position(|p| p.name == keyword) {
                Some(i) if slots[i].is_some() => {
                    return Err(BindError::MultipleValues {
                        function: self.name.clone(),
                        param: keyword,
                    });
                }
                Some(i) => slots[i] = Some(value),
                None if self.varkw.is_some() => {
                    varkw.insert(keyword, value);
                }
                None => {
                    return Err(BindError::UnexpectedKeyword {
                        function: self.name.clone(),
                        keyword,
                    });
                }
            }
        }

        let params = self
            .params
            .iter()
            .zip(slots)
            .map(|(param, slot)| match slot.or_else(|| param.default.clone()) {
                Some(value) => Ok((param.name.clone(), value)),
                None => Err(BindError::MissingArgument {
                    function: self.name.clone(),
                    param: param.name.clone(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BoundArguments::new(params, varargs, varkw))
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self
            .params
            .iter()
            .map(|p| match &p.default {
                Some(default) => format!("{}={default}", p.name),
                None => p.name.clone(),
            })
            .collect();
        if let Some(varargs) = &self.varargs {
            parts.push(format!("*{varargs}"));
        }
        if let Some(varkw) = &self.varkw {
            parts.push(format!("**{varkw}"));
        }
        write!(f, "{}({})", self.name, parts.join(", "))
    }
}

/// Builder for [`MethodSignature`].
///
/// # Example
///
/// ```rust,ignore
/// let sig = MethodSignature::builder("add_column")
///     .param("table_name")
///     .param("column")
///     .param_default("schema", Value::None)
///     .varkw("kw")
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct SignatureBuilder {
    name: String,
    params: Vec<Param>,
    varargs: Option<String>,
    varkw: Option<String>,
}

impl SignatureBuilder {
    /// Add a required parameter.
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param::required(name));
        self
    }

    /// Add a parameter with a default value.
    pub fn param_default(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.params.push(Param::optional(name, default));
        self
    }

    /// Declare the variadic-positional parameter.
    pub fn varargs(mut self, name: impl Into<String>) -> Self {
        self.varargs = Some(name.into());
        self
    }

    /// Declare the variadic-keyword parameter.
    pub fn varkw(mut self, name: impl Into<String>) -> Self {
        self.varkw = Some(name.into());
        self
    }

    /// Capture and validate the signature.
    pub fn build(self) -> Result<MethodSignature, ClassError> {
        MethodSignature::capture(
            self.name,
            self.params,
            self.varargs.as_deref(),
            self.varkw.as_deref(),
        )
    }
}
