//! Type-hierarchy dispatch table.
//!
//! Handlers are registered per `(class, qualifier)` and resolved for a value
//! by walking its class's ancestor chain, most-derived first. At each
//! ancestor a handler for the requested qualifier wins over that ancestor's
//! default handler; the first ancestor with either one decides.

use facade_core::{Class, ClassId, DispatchError, Typed};
use std::{collections::HashMap, fmt, ops::Deref, sync::Arc};

/// The qualifier used when none is given.
pub const DEFAULT_QUALIFIER: &str = "default";

/// A shareable handler that receives the dispatched value.
pub type DynHandler<T, R> = Arc<dyn Fn(&T) -> R + Send + Sync>;

/// A mapping from `(class, qualifier)` to handlers.
///
/// A table is a plain value. [`DispatchTable::branch`] hands out an
/// independent copy, which is how separate contexts get isolated views of the
/// same registrations.
#[derive(Clone)]
pub struct DispatchTable<H> {
    entries: HashMap<ClassId, HashMap<String, H>>,
}

impl<H> Default for DispatchTable<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> DispatchTable<H> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register `handler` for `class` under the default qualifier.
    pub fn register(&mut self, class: &Class, handler: H) -> Result<&mut Self, DispatchError> {
        self.register_qualified(class, DEFAULT_QUALIFIER, handler)
    }

    /// Register `handler` for `(class, qualifier)`.
    ///
    /// A second registration for the same key fails.
    pub fn register_qualified(
        &mut self,
        class: &Class,
        qualifier: &str,
        handler: H,
    ) -> Result<&mut Self, DispatchError> {
        let slots = self.entries.entry(class.id()).or_default();
        if slots.contains_key(qualifier) {
            #[cfg(feature = "tracing")]
            tracing::warn!(class = %class.name(), qualifier, "Duplicate dispatch registration");
            return Err(DispatchError::DuplicateRegistration {
                type_name: class.name().to_owned(),
                qualifier: qualifier.to_owned(),
            });
        }
        slots.insert(qualifier.to_owned(), handler);

        #[cfg(feature = "tracing")]
        tracing::debug!(class = %class.name(), qualifier, "Registered dispatch handler");

        Ok(self)
    }

    /// Whether a handler is registered for exactly `(class, qualifier)`.
    pub fn contains(&self, class: &Class, qualifier: &str) -> bool {
        self.get(class.id(), qualifier).is_some()
    }

    /// Resolve the default handler for `target`.
    pub fn resolve<T: Typed + ?Sized>(&self, target: &T) -> Result<&H, DispatchError> {
        self.resolve_class(target.class(), DEFAULT_QUALIFIER)
    }

    /// Resolve the handler for `target` and `qualifier`.
    pub fn resolve_qualified<T: Typed + ?Sized>(
        &self,
        target: &T,
        qualifier: &str,
    ) -> Result<&H, DispatchError> {
        self.resolve_class(target.class(), qualifier)
    }

    /// Resolve the handler for a class and `qualifier`.
    pub fn resolve_class(&self, class: &Class, qualifier: &str) -> Result<&H, DispatchError> {
        for ancestor in class.mro() {
            if qualifier != DEFAULT_QUALIFIER {
                if let Some(handler) = self.get(ancestor.id(), qualifier) {
                    return Ok(handler);
                }
            }
            if let Some(handler) = self.get(ancestor.id(), DEFAULT_QUALIFIER) {
                return Ok(handler);
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(class = %class.name(), qualifier, "No dispatch handler in ancestor chain");

        Err(DispatchError::Unresolved {
            type_name: class.name().to_owned(),
            qualifier: qualifier.to_owned(),
        })
    }

    /// Resolve a callable handler for `target` and invoke it.
    pub fn dispatch<T, R>(&self, target: &T, qualifier: &str) -> Result<R, DispatchError>
    where
        T: Typed + ?Sized,
        H: Deref,
        H::Target: Fn(&T) -> R,
    {
        let handler = self.resolve_qualified(target, qualifier)?;
        Ok((**handler)(target))
    }

    /// Number of registered `(class, qualifier)` keys.
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    /// Check if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, class: ClassId, qualifier: &str) -> Option<&H> {
        self.entries.get(&class)?.get(qualifier)
    }
}

impl<H: Clone> DispatchTable<H> {
    /// Return a copy of this table that is independently writable.
    pub fn branch(&self) -> Self {
        self.clone()
    }
}

impl<H> fmt::Debug for DispatchTable<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchTable")
            .field("classes", &self.entries.len())
            .field("handlers", &self.len())
            .finish()
    }
}
