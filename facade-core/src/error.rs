//! Error types for facade.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`FacadeError`] - Top-level error type for all facade operations
//! - [`CallError`] - Errors raised while invoking a facade or a method
//! - [`BindError`] - Arguments that do not fit a [`MethodSignature`]
//! - [`ArgumentTranslationError`] - Legacy-name rewriting left a required parameter unfilled
//! - [`RegistryError`] - Misuse of the proxy registry
//! - [`DispatchError`] - Type-hierarchy dispatch failures
//! - [`ClassError`] - Invalid class or signature declarations
//!
//! [`MethodSignature`]: crate::MethodSignature

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all facade operations.
#[derive(Error, Debug)]
pub enum FacadeError {
    /// A facade or method call failed.
    #[error("call error: {0}")]
    Call(#[from] CallError),

    /// The proxy registry was misused.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Dispatch registration or resolution failed.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// A class could not be declared.
    #[error("class error: {0}")]
    Class(#[from] ClassError),

    /// A custom error occurred.
    #[error(transparent)]
    Custom(BoxError),
}

/// Errors raised while calling a facade or invoking a method on an instance.
#[derive(Error, Debug)]
pub enum CallError {
    /// A facade was called while no instance is attached to its scope.
    #[error(
        "can't invoke function '{member}', as the proxy object has not yet been established \
         for the '{class}' class; try placing this code inside a callable"
    )]
    ProxyNotEstablished {
        /// Class whose facade was called.
        class: String,
        /// Member the caller attempted to invoke.
        member: String,
    },

    /// Legacy argument rewriting could not satisfy the signature.
    #[error(transparent)]
    ArgumentTranslation(#[from] ArgumentTranslationError),

    /// The arguments did not match the method signature.
    #[error(transparent)]
    Binding(#[from] BindError),

    /// An argument value had the wrong type.
    #[error(transparent)]
    Value(#[from] ValueError),

    /// No facade with that name is installed in the scope.
    #[error("name '{name}' is not defined in scope '{scope}'")]
    UnknownName {
        /// Scope that was searched.
        scope: String,
        /// Name that was looked up.
        name: String,
    },

    /// The class has no member with that name.
    #[error("'{class}' object has no attribute '{member}'")]
    NoSuchMember {
        /// Class that was searched.
        class: String,
        /// Missing member.
        member: String,
    },

    /// The member exists but is a plain attribute.
    #[error("'{class}.{member}' is not callable")]
    NotCallable {
        /// Owning class.
        class: String,
        /// Attribute name.
        member: String,
    },

    /// The instance does not carry the native payload a method expects.
    #[error("'{class}' instance does not carry a `{expected}` payload")]
    MissingPayload {
        /// Class of the instance.
        class: String,
        /// Rust type the method body expected.
        expected: &'static str,
    },

    /// The method body itself failed.
    #[error("method '{member}' failed: {source}")]
    Method {
        /// Method that failed.
        member: String,
        /// Error returned by the body.
        #[source]
        source: BoxError,
    },
}

/// A required positional parameter was left unfilled after legacy-name rewriting.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("missing required positional argument: {param}")]
pub struct ArgumentTranslationError {
    /// The parameter that could not be filled.
    pub param: String,
}

/// Arguments that cannot be bound to a signature.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// More positional arguments than named parameters and no variadic sink.
    #[error("{function}() takes {expected} positional arguments but {given} were given")]
    TooManyPositional {
        /// Function being called.
        function: String,
        /// Number of named parameters.
        expected: usize,
        /// Number of positional arguments supplied.
        given: usize,
    },

    /// A parameter was filled both positionally and by keyword.
    #[error("{function}() got multiple values for argument '{param}'")]
    MultipleValues {
        /// Function being called.
        function: String,
        /// Parameter that was filled twice.
        param: String,
    },

    /// A keyword matched no parameter and there is no keyword sink.
    #[error("{function}() got an unexpected keyword argument '{keyword}'")]
    UnexpectedKeyword {
        /// Function being called.
        function: String,
        /// The unknown keyword.
        keyword: String,
    },

    /// A parameter without a default received no value.
    #[error("{function}() missing required argument: '{param}'")]
    MissingArgument {
        /// Function being called.
        function: String,
        /// Parameter that was left unfilled.
        param: String,
    },
}

/// A dynamic value could not be converted to the requested Rust type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// The value had a different type.
    #[error("expected {expected}, found {found}")]
    Mismatch {
        /// Expected type name.
        expected: &'static str,
        /// Actual type name.
        found: &'static str,
    },

    /// A bound argument with that name does not exist.
    #[error("no bound argument named '{0}'")]
    Missing(String),
}

/// Errors from proxy registry bookkeeping.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The scope id was not created by this registry.
    #[error("no scope with id {0}")]
    UnknownScope(usize),
}

/// Errors from the type-hierarchy dispatch table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// A handler is already registered for the `(type, qualifier)` key.
    #[error("a handler is already registered for ({type_name}, {qualifier:?})")]
    DuplicateRegistration {
        /// Name of the registered type.
        type_name: String,
        /// Qualifier of the registration.
        qualifier: String,
    },

    /// No ancestor of the type has a handler for the qualifier or the default.
    #[error("no dispatch function for object of type '{type_name}' (qualifier {qualifier:?})")]
    Unresolved {
        /// Concrete type of the dispatched object.
        type_name: String,
        /// Requested qualifier.
        qualifier: String,
    },
}

/// Errors raised while declaring classes and signatures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassError {
    /// The bases admit no consistent C3 linearization.
    #[error("cannot create a consistent ancestor chain for class '{class}'")]
    InconsistentHierarchy {
        /// Class being declared.
        class: String,
    },

    /// A parameter list is malformed.
    #[error("invalid signature for {function}(): {reason}")]
    InvalidSignature {
        /// Function being declared.
        function: String,
        /// What is wrong with it.
        reason: String,
    },
}

// Convenience conversions
impl From<BoxError> for FacadeError {
    fn from(err: BoxError) -> Self {
        FacadeError::Custom(err)
    }
}

impl From<ArgumentTranslationError> for FacadeError {
    fn from(err: ArgumentTranslationError) -> Self {
        FacadeError::Call(err.into())
    }
}

impl From<BindError> for FacadeError {
    fn from(err: BindError) -> Self {
        FacadeError::Call(err.into())
    }
}
