//! Forwarding plans: how a facade re-issues a call against the real method.
//!
//! A [`ForwardingPlan`] pairs the parameter list a facade declares (its
//! [`OuterParams`]) with the argument expression used to forward the call
//! (a list of [`InnerArg`]). Building the plan once at registration time
//! replaces any need to synthesize code at runtime.

use crate::{
    args::{Args, BoundArguments},
    error::BindError,
    signature::MethodSignature,
};
use std::{collections::BTreeMap, fmt, sync::Arc};

/// The parameter list a facade callable declares.
#[derive(Debug, Clone, PartialEq)]
pub enum OuterParams {
    /// The facade declares exactly the method's own signature.
    Declared(Arc<MethodSignature>),
    /// The facade accepts `(*args, **kw)` and passes them through untouched.
    Variadic,
}

/// One element of the forwarded call's argument expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InnerArg {
    /// Pass the bound parameter positionally.
    Positional(String),
    /// Pass the bound parameter as `name=name`.
    Keyword(String),
    /// Spread the variadic-positional overflow.
    SpreadPositional(String),
    /// Spread the variadic-keyword overflow.
    SpreadKeywords(String),
}

impl fmt::Display for InnerArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InnerArg::Positional(name) => f.write_str(name),
            InnerArg::Keyword(name) => write!(f, "{name}={name}"),
            InnerArg::SpreadPositional(name) => write!(f, "*{name}"),
            InnerArg::SpreadKeywords(name) => write!(f, "**{name}"),
        }
    }
}

/// Outer parameters plus inner call expression for one facade.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardingPlan {
    outer: OuterParams,
    inner: Vec<InnerArg>,
}

impl ForwardingPlan {
    /// Build the plan that preserves `signature` exactly.
    ///
    /// Required parameters forward positionally and defaulted ones by
    /// keyword. When the signature has a variadic-positional sink, defaulted
    /// parameters forward positionally too, so that spread overflow can never
    /// collide with a keyword for the same slot.
    pub fn build(signature: Arc<MethodSignature>) -> Self {
        let has_varargs = signature.varargs().is_some();
        let mut inner: Vec<InnerArg> = signature
            .params()
            .iter()
            .map(|p| {
                if p.has_default() && !has_varargs {
                    InnerArg::Keyword(p.name().to_owned())
                } else {
                    InnerArg::Positional(p.name().to_owned())
                }
            })
            .collect();
        if let Some(varargs) = signature.varargs() {
            inner.push(InnerArg::SpreadPositional(varargs.to_owned()));
        }
        if let Some(varkw) = signature.varkw() {
            inner.push(InnerArg::SpreadKeywords(varkw.to_owned()));
        }
        Self {
            outer: OuterParams::Declared(signature),
            inner,
        }
    }

    /// The `(*args, **kw)` pass-through plan used when legacy names must be
    /// rewritten before the real signature is applied.
    pub fn passthrough() -> Self {
        Self {
            outer: OuterParams::Variadic,
            inner: vec![
                InnerArg::SpreadPositional("args".to_owned()),
                InnerArg::SpreadKeywords("kw".to_owned()),
            ],
        }
    }

    /// The parameters the facade declares.
    pub fn outer(&self) -> &OuterParams {
        &self.outer
    }

    /// The forwarded call's argument expression.
    pub fn inner(&self) -> &[InnerArg] {
        &self.inner
    }

    /// Render the inner call expression, e.g. `a, b=b, **kw`.
    pub fn inner_expression(&self) -> String {
        self.inner
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Turn the facade's incoming arguments into the forwarded call's arguments.
    pub fn prepare(&self, args: Args) -> Result<Args, BindError> {
        match &self.outer {
            OuterParams::Declared(signature) => {
                let bound = signature.bind(args)?;
                Ok(self.forward(&bound))
            }
            OuterParams::Variadic => Ok(args),
        }
    }

    fn forward(&self, bound: &BoundArguments) -> Args {
        let mut positional = Vec::new();
        let mut keywords = BTreeMap::new();
        for arg in &self.inner {
            match arg {
                InnerArg::Positional(name) => {
                    positional.extend(bound.get(name).cloned());
                }
                InnerArg::Keyword(name) => {
                    if let Some(value) = bound.get(name) {
                        keywords.insert(name.clone(), value.clone());
                    }
                }
                InnerArg::SpreadPositional(_) => {
                    positional.extend(bound.varargs().iter().cloned());
                }
                InnerArg::SpreadKeywords(_) => {
                    keywords.extend(bound.varkw().clone());
                }
            }
        }
        Args::from_parts(positional, keywords)
    }
}
