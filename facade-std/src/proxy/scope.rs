//! Scopes: the namespaces facades are installed into.

use super::facade::Facade;
use facade_core::{Args, CallError, Instance, Value};
use std::{collections::BTreeMap, sync::Arc};

/// Handle to a [`Scope`] owned by a [`ProxyRegistry`].
///
/// A handle is only valid for the registry that created it; any other
/// registry rejects it with `UnknownScope`.
///
/// [`ProxyRegistry`]: super::ProxyRegistry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId {
    pub(crate) registry: u64,
    pub(crate) index: usize,
}

impl ScopeId {
    /// Position of the scope within its registry.
    pub fn index(self) -> usize {
        self.index
    }
}

/// A namespace holding facade callables, the attribute values bound from the
/// active instance, and the active-instance slot itself.
///
/// Scopes are created and mutated only through the owning registry, so a
/// scope is never observed half-way through an attach or detach.
#[derive(Debug)]
pub struct Scope {
    id: ScopeId,
    name: String,
    facades: BTreeMap<String, Facade>,
    bindings: BTreeMap<String, Value>,
    active: Option<Arc<Instance>>,
}

impl Scope {
    pub(crate) fn new(id: ScopeId, name: String) -> Self {
        Self {
            id,
            name,
            facades: BTreeMap::new(),
            bindings: BTreeMap::new(),
            active: None,
        }
    }

    /// The scope's handle.
    pub fn id(&self) -> ScopeId {
        self.id
    }

    /// The scope's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The instance facades currently forward to.
    pub fn active(&self) -> Option<&Arc<Instance>> {
        self.active.as_ref()
    }

    /// The attribute value bound under `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    /// The facade installed under `name`.
    pub fn facade(&self, name: &str) -> Option<&Facade> {
        self.facades.get(name)
    }

    /// Whether `name` is bound or has a facade.
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name) || self.facades.contains_key(name)
    }

    /// Bound attribute values.
    pub fn bindings(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.bindings.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Installed facades.
    pub fn facades(&self) -> impl Iterator<Item = &Facade> {
        self.facades.values()
    }

    /// Call the facade installed under `name`.
    pub fn call(&self, name: &str, args: Args) -> Result<Value, CallError> {
        let facade = self.facades.get(name).ok_or_else(|| CallError::UnknownName {
            scope: self.name.clone(),
            name: name.to_owned(),
        })?;
        facade.call(self.active.as_deref(), args)
    }

    pub(crate) fn install_facade(&mut self, facade: Facade) {
        self.bindings.remove(facade.name());
        self.facades.insert(facade.name().to_owned(), facade);
    }

    pub(crate) fn remove_facade(&mut self, name: &str) {
        self.facades.remove(name);
    }

    pub(crate) fn bind(&mut self, name: &str, value: Value) {
        self.facades.remove(name);
        self.bindings.insert(name.to_owned(), value);
    }

    pub(crate) fn unbind(&mut self, name: &str) {
        self.bindings.remove(name);
    }

    pub(crate) fn set_active(&mut self, instance: Option<Arc<Instance>>) {
        self.active = instance;
    }
}
