//! Classes of the dynamic object model.
//!
//! A [`Class`] has a name, direct bases, a cached ancestor chain and a member
//! table. The ancestor chain is the C3 linearization of the bases, computed
//! once when the class is built: most-derived first, each class before its
//! bases, and declaration order of bases preserved.
//!
//! # Architecture
//!
//! ```text
//! Class
//! ├── id: ClassId           (unique, allocated from a global counter)
//! ├── name: String
//! ├── bases: Vec<Arc<Class>>
//! ├── ancestors: Vec<Arc<Class>>   (C3 order, excluding the class itself)
//! └── members: RwLock<BTreeMap<String, Member>>
//! ```
//!
//! Bases and ancestors are immutable after construction. Members may be added
//! later with [`Class::set_member`]; the lock only exists so that a class
//! shared by its instances can still gain members.

use crate::{
    args::{Args, BoundArguments},
    error::{BoxError, CallError, ClassError},
    instance::Instance,
    signature::MethodSignature,
    translate::LegacyNames,
    value::{IntoReturn, Value},
};
use std::{
    collections::{BTreeMap, BTreeSet, VecDeque},
    fmt,
    iter,
    sync::{
        Arc, PoisonError, RwLock,
        atomic::{AtomicU64, Ordering},
    },
};

/// Global counter for allocating unique class ids.
static NEXT_CLASS_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identity of a [`Class`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u64);

impl ClassId {
    fn allocate() -> Self {
        Self(NEXT_CLASS_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw id.
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// The body of a method: receives the instance and the bound arguments.
pub type MethodBody =
    Arc<dyn Fn(&Instance, &BoundArguments) -> Result<Value, BoxError> + Send + Sync>;

/// A callable member: signature, body, legacy renames and documentation.
#[derive(Clone)]
pub struct Method {
    signature: Arc<MethodSignature>,
    body: MethodBody,
    legacy_names: LegacyNames,
    doc: Option<String>,
}

impl Method {
    /// Create a method from its signature and body.
    pub fn new<F, R>(signature: MethodSignature, body: F) -> Self
    where
        F: Fn(&Instance, &BoundArguments) -> R + Send + Sync + 'static,
        R: IntoReturn,
    {
        Self {
            signature: Arc::new(signature),
            body: Arc::new(move |instance: &Instance, bound: &BoundArguments| {
                body(instance, bound).into_return()
            }),
            legacy_names: LegacyNames::new(),
            doc: None,
        }
    }

    /// Create a method from a body that already produces a call result.
    ///
    /// This is the form generated by `#[facade::class]`.
    pub fn from_body<F>(signature: MethodSignature, body: F) -> Self
    where
        F: Fn(&Instance, &BoundArguments) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        Self {
            signature: Arc::new(signature),
            body: Arc::new(body),
            legacy_names: LegacyNames::new(),
            doc: None,
        }
    }

    /// Accept old keyword names for this method's parameters.
    pub fn with_legacy_names(mut self, legacy_names: LegacyNames) -> Self {
        self.legacy_names = legacy_names;
        self
    }

    /// Attach documentation, carried onto facades.
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// The captured signature.
    pub fn signature(&self) -> &Arc<MethodSignature> {
        &self.signature
    }

    /// Legacy keyword renames.
    pub fn legacy_names(&self) -> &LegacyNames {
        &self.legacy_names
    }

    /// Documentation, if any.
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// Bind `args` to the signature and run the body against `instance`.
    pub fn invoke(&self, instance: &Instance, args: Args) -> Result<Value, CallError> {
        let bound = self.signature.bind(args)?;
        (self.body)(instance, &bound).map_err(|source| CallError::Method {
            member: self.signature.name().to_owned(),
            source,
        })
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("signature", &self.signature.to_string())
            .field("legacy_names", &self.legacy_names)
            .field("doc", &self.doc)
            .finish_non_exhaustive()
    }
}

/// A class member.
#[derive(Debug, Clone)]
pub enum Member {
    /// A callable method.
    Method(Method),
    /// A plain attribute with its class-level value.
    Attribute(Value),
}

impl Member {
    /// Whether the member can be called.
    pub fn is_callable(&self) -> bool {
        matches!(self, Member::Method(_))
    }

    /// The method, if this member is one.
    pub fn as_method(&self) -> Option<&Method> {
        match self {
            Member::Method(method) => Some(method),
            Member::Attribute(_) => None,
        }
    }
}

impl From<Method> for Member {
    fn from(method: Method) -> Self {
        Member::Method(method)
    }
}

impl From<Value> for Member {
    fn from(value: Value) -> Self {
        Member::Attribute(value)
    }
}

/// A class of the dynamic object model.
pub struct Class {
    id: ClassId,
    name: String,
    bases: Vec<Arc<Class>>,
    ancestors: Vec<Arc<Class>>,
    members: RwLock<BTreeMap<String, Member>>,
}

impl Class {
    /// Start declaring a class.
    pub fn builder(name: impl Into<String>) -> ClassBuilder {
        ClassBuilder {
            name: name.into(),
            bases: Vec::new(),
            members: BTreeMap::new(),
        }
    }

    /// The unique id.
    #[inline]
    pub fn id(&self) -> ClassId {
        self.id
    }

    /// The class name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Direct bases in declaration order.
    #[inline]
    pub fn bases(&self) -> &[Arc<Class>] {
        &self.bases
    }

    /// The ancestor chain, most-derived first, starting with this class.
    pub fn mro(&self) -> impl Iterator<Item = &Class> {
        iter::once(self).chain(self.ancestors.iter().map(AsRef::as_ref))
    }

    /// Whether `other` appears in this class's ancestor chain (or is this class).
    pub fn is_subclass_of(&self, other: &Class) -> bool {
        self.mro().any(|c| c.id == other.id)
    }

    /// Add or replace a member on this class.
    ///
    /// Scopes that already expose this class only see the change once the
    /// proxy registry is notified.
    pub fn set_member(&self, name: impl Into<String>, member: impl Into<Member>) {
        self.members
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), member.into());
    }

    /// A member declared directly on this class.
    pub fn own_member(&self, name: &str) -> Option<Member> {
        self.members
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Resolve a member through the ancestor chain.
    pub fn lookup(&self, name: &str) -> Option<Member> {
        self.mro().find_map(|c| c.own_member(name))
    }

    /// Names of all members, inherited ones included, in sorted order.
    pub fn member_names(&self) -> BTreeSet<String> {
        self.mro()
            .flat_map(|c| {
                c.members
                    .read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .keys()
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("id", &self.id)
            .field("name", &self.name)
            .field(
                "mro",
                &self.mro().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

/// Builder for [`Class`].
///
/// # Example
///
/// ```rust,ignore
/// let base = Class::builder("Operations").build()?;
/// let batch = Class::builder("BatchOperations")
///     .base(&base)
///     .attribute("recreate", "auto")
///     .method("add_column", add_column)
///     .build()?;
/// ```
pub struct ClassBuilder {
    name: String,
    bases: Vec<Arc<Class>>,
    members: BTreeMap<String, Member>,
}

impl ClassBuilder {
    /// Add a direct base. Order of calls is declaration order.
    pub fn base(mut self, base: &Arc<Class>) -> Self {
        self.bases.push(Arc::clone(base));
        self
    }

    /// Declare a method.
    pub fn method(mut self, name: impl Into<String>, method: Method) -> Self {
        self.members.insert(name.into(), Member::Method(method));
        self
    }

    /// Declare an attribute with its class-level value.
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.members
            .insert(name.into(), Member::Attribute(value.into()));
        self
    }

    /// Compute the ancestor chain and create the class.
    pub fn build(self) -> Result<Arc<Class>, ClassError> {
        let ancestors =
            linearize(&self.bases).ok_or_else(|| ClassError::InconsistentHierarchy {
                class: self.name.clone(),
            })?;
        Ok(Arc::new(Class {
            id: ClassId::allocate(),
            name: self.name,
            bases: self.bases,
            ancestors,
            members: RwLock::new(self.members),
        }))
    }
}

/// C3 merge of the bases' chains followed by the list of bases itself.
///
/// Returns `None` when no class can be selected as the next head, which
/// means the hierarchy has no consistent order (including duplicate bases).
fn linearize(bases: &[Arc<Class>]) -> Option<Vec<Arc<Class>>> {
    let mut sequences: Vec<VecDeque<Arc<Class>>> = bases
        .iter()
        .map(|base| {
            iter::once(Arc::clone(base))
                .chain(base.ancestors.iter().cloned())
                .collect()
        })
        .collect();
    sequences.push(bases.iter().cloned().collect());

    let mut chain = Vec::new();
    loop {
        sequences.retain(|seq| !seq.is_empty());
        if sequences.is_empty() {
            return Some(chain);
        }

        let head = sequences
            .iter()
            .filter_map(|seq| seq.front())
            .find(|candidate| {
                !sequences
                    .iter()
                    .any(|seq| seq.iter().skip(1).any(|c| c.id == candidate.id))
            })
            .cloned()?;

        for seq in &mut sequences {
            if seq.front().is_some_and(|c| c.id == head.id) {
                seq.pop_front();
            }
        }
        chain.push(head);
    }
}
