//! Proxy registry: exposes the members of an active instance through scopes.
//!
//! The registry keeps one [`ClassRegistration`] per class: the names of the
//! plain attributes it exposes and the scopes it was installed into.
//! Registration is not a snapshot. When a class gains a member after it was
//! registered, [`ProxyRegistry::notify_member_added`] re-propagates that
//! member into every scope already holding the class.

use super::{
    facade::Facade,
    scope::{Scope, ScopeId},
};
use facade_core::{
    Args, Class, ClassId, FacadeError, Instance, Member, RegistryError, Value,
};
use std::{
    borrow::Cow,
    collections::{BTreeSet, HashMap},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

/// Global counter tagging scope handles with the registry that issued them.
static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(1);

/// Registry-wide options.
#[derive(Debug, Clone)]
pub struct ProxyOptions {
    hidden_prefix: Cow<'static, str>,
}

impl Default for ProxyOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ProxyOptions {
    /// Default options: members starting with `_` are internal.
    pub fn new() -> Self {
        Self {
            hidden_prefix: Cow::Borrowed("_"),
        }
    }

    /// Set the prefix marking internal members. An empty prefix exposes all.
    pub fn with_hidden_prefix(mut self, prefix: impl Into<Cow<'static, str>>) -> Self {
        self.hidden_prefix = prefix.into();
        self
    }

    /// The prefix marking internal members.
    pub fn hidden_prefix(&self) -> &str {
        &self.hidden_prefix
    }

    /// Whether `name` is exposed through scopes.
    pub fn is_public(&self, name: &str) -> bool {
        self.hidden_prefix.is_empty() || !name.starts_with(self.hidden_prefix.as_ref())
    }
}

/// Per-class registration record.
#[derive(Debug)]
pub struct ClassRegistration {
    class: Arc<Class>,
    exposed: BTreeSet<String>,
    scopes: Vec<ScopeId>,
}

impl ClassRegistration {
    fn new(class: Arc<Class>) -> Self {
        Self {
            class,
            exposed: BTreeSet::new(),
            scopes: Vec::new(),
        }
    }

    /// The registered class.
    pub fn class(&self) -> &Arc<Class> {
        &self.class
    }

    /// Names of the plain attributes bound on attach.
    pub fn exposed_names(&self) -> &BTreeSet<String> {
        &self.exposed
    }

    /// Scopes the class was installed into, in registration order.
    pub fn scopes(&self) -> &[ScopeId] {
        &self.scopes
    }
}

/// Owns scopes and class registrations.
///
/// All mutation goes through `&mut self`; there is no internal locking.
///
/// # Example
///
/// ```rust,ignore
/// let mut registry = ProxyRegistry::new();
/// let op = registry.create_scope("op");
/// registry.register_class(&operations, op)?;
///
/// registry.attach_instance(&Arc::new(Instance::new(operations.clone())));
/// registry.call(op, "add_column", Args::new().arg("account").arg("x"))?;
/// ```
#[derive(Debug)]
pub struct ProxyRegistry {
    id: u64,
    options: ProxyOptions,
    scopes: Vec<Scope>,
    registrations: HashMap<ClassId, ClassRegistration>,
}

impl Default for ProxyRegistry {
    fn default() -> Self {
        Self::with_options(ProxyOptions::default())
    }
}

impl ProxyRegistry {
    /// Create a registry with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the given options.
    pub fn with_options(options: ProxyOptions) -> Self {
        Self {
            id: NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed),
            options,
            scopes: Vec::new(),
            registrations: HashMap::new(),
        }
    }

    /// The registry's options.
    pub fn options(&self) -> &ProxyOptions {
        &self.options
    }

    /// Create a new, empty scope.
    pub fn create_scope(&mut self, name: impl Into<String>) -> ScopeId {
        let id = ScopeId {
            registry: self.id,
            index: self.scopes.len(),
        };
        self.scopes.push(Scope::new(id, name.into()));
        id
    }

    /// Look up a scope.
    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.slot(id).ok().and_then(|index| self.scopes.get(index))
    }

    /// The registration record of `class`, if it was registered.
    pub fn registration(&self, class: &Class) -> Option<&ClassRegistration> {
        self.registrations.get(&class.id())
    }

    /// Install every public member of `class` into `scope`.
    ///
    /// Methods get a facade; plain attributes are recorded as exposed names
    /// and bound when an instance is attached. Registering the same class into
    /// the same scope again is idempotent.
    pub fn register_class(&mut self, class: &Arc<Class>, scope: ScopeId) -> Result<(), RegistryError> {
        let index = self.slot(scope)?;
        let target = &mut self.scopes[index];
        let registration = self
            .registrations
            .entry(class.id())
            .or_insert_with(|| ClassRegistration::new(Arc::clone(class)));

        for name in class.member_names() {
            if self.options.is_public(&name) {
                propagate(class, &name, &mut registration.exposed, target);
            }
        }
        if !registration.scopes.contains(&scope) {
            registration.scopes.push(scope);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            class = %class.name(),
            scope = %target.name(),
            facades = target.facades().count(),
            exposed = registration.exposed.len(),
            "Registered class into scope"
        );

        Ok(())
    }

    /// Re-propagate member `name` of `class` into every scope that already
    /// exposes the class or one of its subclasses.
    ///
    /// Subclasses that shadow `name` keep their own member.
    pub fn notify_member_added(&mut self, class: &Class, name: &str) {
        if !self.options.is_public(name) {
            return;
        }
        for registration in self.registrations.values_mut() {
            if !registration.class.is_subclass_of(class) {
                continue;
            }
            for id in &registration.scopes {
                if let Some(scope) = self.scopes.get_mut(id.index) {
                    propagate(&registration.class, name, &mut registration.exposed, scope);
                }
            }

            #[cfg(feature = "tracing")]
            tracing::debug!(
                class = %registration.class.name(),
                member = %name,
                scopes = registration.scopes.len(),
                "Propagated new member"
            );
        }
    }

    /// Set a member on `class` and propagate it in one step.
    pub fn add_member(&mut self, class: &Class, name: &str, member: impl Into<Member>) {
        class.set_member(name, member);
        self.notify_member_added(class, name);
    }

    /// Make `instance` the active instance of every scope its class is
    /// registered in.
    ///
    /// Every public member of the class is re-installed into those scopes:
    /// methods get their facade back and attributes are bound to the
    /// instance's value, replacing whatever another class left under the same
    /// name. Any previously active instance is replaced. Classes without a
    /// registration are ignored; registrations are per exact class.
    pub fn attach_instance(&mut self, instance: &Arc<Instance>) {
        let Some(registration) = self.registrations.get_mut(&instance.class().id()) else {
            #[cfg(feature = "tracing")]
            tracing::trace!(class = %instance.class().name(), "Attach skipped: class not registered");
            return;
        };

        let class = Arc::clone(&registration.class);
        let options = &self.options;
        let names: Vec<String> = class
            .member_names()
            .into_iter()
            .filter(|name| options.is_public(name))
            .collect();

        for id in &registration.scopes {
            let Some(scope) = self.scopes.get_mut(id.index) else {
                continue;
            };
            scope.set_active(Some(Arc::clone(instance)));
            for name in &names {
                propagate(&class, name, &mut registration.exposed, scope);
            }

            #[cfg(feature = "tracing")]
            tracing::debug!(class = %class.name(), scope = %scope.name(), "Attached instance");
        }
    }

    /// Clear the active instance and every exposed binding from all scopes the
    /// instance's class is registered in.
    pub fn detach_instance(&mut self, instance: &Instance) {
        let Some(registration) = self.registrations.get(&instance.class().id()) else {
            return;
        };

        for id in &registration.scopes {
            let Some(scope) = self.scopes.get_mut(id.index) else {
                continue;
            };
            scope.set_active(None);
            for name in &registration.exposed {
                scope.unbind(name);
            }

            #[cfg(feature = "tracing")]
            tracing::debug!(class = %instance.class().name(), scope = %scope.name(), "Detached instance");
        }
    }

    /// Call the facade `name` installed in `scope`.
    pub fn call(&self, scope: ScopeId, name: &str, args: Args) -> Result<Value, FacadeError> {
        let index = self.slot(scope)?;
        Ok(self.scopes[index].call(name, args)?)
    }

    /// Validate that `id` was issued by this registry.
    fn slot(&self, id: ScopeId) -> Result<usize, RegistryError> {
        if id.registry == self.id && id.index < self.scopes.len() {
            Ok(id.index)
        } else {
            Err(RegistryError::UnknownScope(id.index))
        }
    }
}

/// Install the current binding for `name` into one scope.
///
/// A member that changed kind replaces its previous binding. Attributes are
/// bound immediately when the scope's active instance is of `class`.
fn propagate(class: &Class, name: &str, exposed: &mut BTreeSet<String>, scope: &mut Scope) {
    match class.lookup(name) {
        Some(Member::Method(method)) => {
            exposed.remove(name);
            scope.install_facade(Facade::new(class, name, &method));
        }
        Some(Member::Attribute(_)) => {
            exposed.insert(name.to_owned());
            scope.remove_facade(name);
            let value = scope
                .active()
                .filter(|active| active.class().id() == class.id())
                .and_then(|active| active.attribute(name));
            if let Some(value) = value {
                scope.bind(name, value);
            }
        }
        None => {}
    }
}
