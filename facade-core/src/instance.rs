//! Instances of dynamic classes, and the [`Typed`] bridge used by dispatch.

use crate::{
    args::Args,
    class::{Class, ClassBuilder, Member},
    error::{CallError, ClassError},
    value::Value,
};
use std::{any::Any, collections::BTreeMap, fmt, sync::Arc};

/// A live object: its class, per-instance attribute values and an optional
/// native Rust payload.
pub struct Instance {
    class: Arc<Class>,
    attributes: BTreeMap<String, Value>,
    payload: Option<Box<dyn Any + Send + Sync>>,
}

impl Instance {
    /// Create an instance with no overrides and no payload.
    pub fn new(class: Arc<Class>) -> Self {
        Self {
            class,
            attributes: BTreeMap::new(),
            payload: None,
        }
    }

    /// Override an attribute on this instance.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Attach the native value that generated method bodies operate on.
    pub fn with_payload<T: Any + Send + Sync>(mut self, payload: T) -> Self {
        self.payload = Some(Box::new(payload));
        self
    }

    /// The instance's class.
    #[inline]
    pub fn class(&self) -> &Arc<Class> {
        &self.class
    }

    /// The native payload, if it has type `T`.
    pub fn payload<T: Any>(&self) -> Option<&T> {
        self.payload.as_deref().and_then(|p| p.downcast_ref::<T>())
    }

    /// Like [`Instance::payload`], but reports a missing payload as an error.
    pub fn require_payload<T: Any>(&self) -> Result<&T, CallError> {
        self.payload().ok_or_else(|| CallError::MissingPayload {
            class: self.class.name().to_owned(),
            expected: std::any::type_name::<T>(),
        })
    }

    /// The value of a plain attribute: the instance override if present,
    /// otherwise the class-level value found through the ancestor chain.
    ///
    /// Returns `None` for methods and unknown names.
    pub fn attribute(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.attributes.get(name) {
            return Some(value.clone());
        }
        match self.class.lookup(name)? {
            Member::Attribute(value) => Some(value),
            Member::Method(_) => None,
        }
    }

    /// Call a method on this instance, binding `args` to its signature.
    pub fn call_method(&self, name: &str, args: Args) -> Result<Value, CallError> {
        match self.class.lookup(name) {
            Some(Member::Method(method)) => method.invoke(self, args),
            Some(Member::Attribute(_)) => Err(CallError::NotCallable {
                class: self.class.name().to_owned(),
                member: name.to_owned(),
            }),
            None => Err(CallError::NoSuchMember {
                class: self.class.name().to_owned(),
                member: name.to_owned(),
            }),
        }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.class.name())
            .field("attributes", &self.attributes)
            .field("has_payload", &self.payload.is_some())
            .finish()
    }
}

/// Anything whose concrete type is described by a [`Class`].
///
/// Dispatch tables resolve handlers for any `Typed` value, so plain Rust types
/// can take part by mapping themselves to a statically built class.
pub trait Typed {
    /// The concrete class of this value.
    fn class(&self) -> &Arc<Class>;
}

impl Typed for Instance {
    fn class(&self) -> &Arc<Class> {
        &self.class
    }
}

impl<T: Typed + ?Sized> Typed for Arc<T> {
    fn class(&self) -> &Arc<Class> {
        (**self).class()
    }
}

impl<T: Typed + ?Sized> Typed for Box<T> {
    fn class(&self) -> &Arc<Class> {
        (**self).class()
    }
}

impl<T: Typed + ?Sized> Typed for &T {
    fn class(&self) -> &Arc<Class> {
        (**self).class()
    }
}

/// A Rust type whose methods are exposed as a dynamic class.
///
/// Usually implemented by `#[facade::class]` on an `impl` block.
pub trait ProxyClass: Any + Send + Sync + Sized {
    /// A builder pre-populated with the captured methods.
    fn class_builder() -> Result<ClassBuilder, ClassError>;

    /// Build the class.
    fn build_class() -> Result<Arc<Class>, ClassError> {
        Self::class_builder()?.build()
    }

    /// Wrap `self` as an instance of `class`.
    fn into_instance(self, class: &Arc<Class>) -> Instance {
        Instance::new(Arc::clone(class)).with_payload(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{class::Method, signature::MethodSignature};

    fn counter_class() -> Arc<Class> {
        let sig = MethodSignature::builder("describe")
            .param("prefix")
            .build()
            .unwrap();
        Class::builder("Counter")
            .attribute("start", 0)
            .method(
                "describe",
                Method::new(sig, |instance: &Instance, bound| {
                    let prefix: String = bound.extract("prefix")?;
                    let start = instance.attribute("start").unwrap_or_default();
                    Ok::<_, crate::error::ValueError>(format!("{prefix}{start}"))
                }),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_attribute_override() {
        let class = counter_class();
        let plain = Instance::new(class.clone());
        let custom = Instance::new(class).with_attr("start", 5);
        assert_eq!(plain.attribute("start"), Some(Value::Int(0)));
        assert_eq!(custom.attribute("start"), Some(Value::Int(5)));
        assert_eq!(custom.attribute("describe"), None);
    }

    #[test]
    fn test_call_method() {
        let instance = Instance::new(counter_class()).with_attr("start", 3);
        let out = instance
            .call_method("describe", Args::new().arg("n="))
            .unwrap();
        assert_eq!(out, Value::from("n=3"));
    }

    #[test]
    fn test_call_errors() {
        let instance = Instance::new(counter_class());
        assert!(matches!(
            instance.call_method("start", Args::new()),
            Err(CallError::NotCallable { .. })
        ));
        assert!(matches!(
            instance.call_method("nope", Args::new()),
            Err(CallError::NoSuchMember { .. })
        ));
        assert!(matches!(
            instance.call_method("describe", Args::new()),
            Err(CallError::Binding(_))
        ));
    }

    #[test]
    fn test_payload_downcast() {
        let instance = Instance::new(counter_class()).with_payload(42u32);
        assert_eq!(instance.payload::<u32>(), Some(&42));
        assert!(instance.payload::<String>().is_none());
        assert!(matches!(
            instance.require_payload::<String>(),
            Err(CallError::MissingPayload { .. })
        ));
    }
}
