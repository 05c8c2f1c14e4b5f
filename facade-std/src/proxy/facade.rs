//! Facade callables.

use facade_core::{
    Args, ArgumentTranslator, CallError, Class, ForwardingPlan, Instance, LegacyNames, Method,
    MethodSignature, Value,
};
use std::sync::Arc;

/// A free-standing callable that forwards to a method of a scope's active
/// instance.
///
/// The facade declares the same parameters as the method, so callers observe
/// the method's calling convention. Methods carrying legacy names get a
/// `(*args, **kw)` facade instead and have their keywords rewritten before the
/// call is forwarded.
#[derive(Debug, Clone)]
pub struct Facade {
    class_name: String,
    name: String,
    signature: Arc<MethodSignature>,
    legacy_names: LegacyNames,
    plan: ForwardingPlan,
    doc: Option<String>,
}

impl Facade {
    /// Build the facade for member `name` of `class`.
    pub fn new(class: &Class, name: &str, method: &Method) -> Self {
        let signature = Arc::clone(method.signature());
        let plan = if method.legacy_names().is_empty() {
            ForwardingPlan::build(Arc::clone(&signature))
        } else {
            ForwardingPlan::passthrough()
        };
        Self {
            class_name: class.name().to_owned(),
            name: name.to_owned(),
            signature,
            legacy_names: method.legacy_names().clone(),
            plan,
            doc: method.doc().map(str::to_owned),
        }
    }

    /// The exposed name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the class the facade was built from.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// The underlying method's signature.
    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    /// The forwarding plan.
    pub fn plan(&self) -> &ForwardingPlan {
        &self.plan
    }

    /// Documentation copied from the method.
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// Forward a call to `active`.
    ///
    /// Arguments are prepared (bound or translated) before the active instance
    /// is checked, so malformed calls report the argument problem first.
    pub fn call(&self, active: Option<&Instance>, args: Args) -> Result<Value, CallError> {
        let mut args = self.plan.prepare(args)?;
        if !self.legacy_names.is_empty() {
            args = ArgumentTranslator::new(&self.signature, &self.legacy_names).translate(args)?;
        }

        let Some(instance) = active else {
            return Err(CallError::ProxyNotEstablished {
                class: self.class_name.clone(),
                member: self.name.clone(),
            });
        };
        instance.call_method(&self.name, args)
    }
}
