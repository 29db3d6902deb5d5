//! Error types for Warden guards

use thiserror::Error;

/// Failure raised by the throwing guard kinds (`assert`, `assertWrap`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct AssertionError {
    message: String,
}

impl AssertionError {
    /// Error name, stable across all assertion failures
    pub const NAME: &'static str = "AssertionError";

    pub fn new(message: impl Into<String>) -> Self {
        AssertionError {
            message: message.into(),
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    /// Composed failure text
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors raised from inside a predicate implementation.
///
/// These are distinct from a predicate returning `false`: the predicate
/// could not decide at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PredicateError {
    #[error("expected {expected} argument(s), got {actual}")]
    Arity { expected: usize, actual: usize },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Failed(String),
}

/// Errors surfaced by a guard invocation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
    #[error(transparent)]
    Assertion(#[from] AssertionError),

    #[error("predicate {name} failed internally: {source}")]
    Predicate {
        name: String,
        #[source]
        source: PredicateError,
    },
}

impl GuardError {
    /// Was this a plain assertion failure (as opposed to a broken predicate)?
    pub fn is_assertion(&self) -> bool {
        matches!(self, GuardError::Assertion(_))
    }

    pub fn as_assertion(&self) -> Option<&AssertionError> {
        match self {
            GuardError::Assertion(err) => Some(err),
            GuardError::Predicate { .. } => None,
        }
    }
}

/// Configuration errors raised while building or resolving guards.
///
/// These are setup-time failures; no guard call ever produces one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Duplicate guard name: {0}")]
    Duplicate(String),

    #[error("Override for unregistered guard: {0}")]
    UnknownOverride(String),

    #[error("Unknown guard: {0}")]
    UnknownMember(String),

    #[error("Invalid guard name: {0:?}")]
    InvalidName(String),
}

/// Result type for guard invocations
pub type GuardResult<T> = Result<T, GuardError>;

/// Result type for registry construction and member lookup
pub type RegistryResult<T> = Result<T, RegistryError>;
