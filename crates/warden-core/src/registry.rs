//! Predicate registry
//!
//! An insertion-ordered table of named predicates. The registry is only
//! mutable while a [`crate::GuardsBuilder`] owns it; once guards are built it
//! is read-only.

use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde_json::Value;

use crate::{render_template, PredicateError, RegistryError, RegistryResult};

/// Predicate signature: `(input, extra args) -> passed?`
///
/// Predicates report internal problems by returning `Err`. A panic inside a
/// predicate is caught and surfaced as [`PredicateError::Failed`], so the
/// non-throwing kinds still never unwind.
pub type PredicateFn = dyn Fn(&Value, &[Value]) -> Result<bool, PredicateError> + Send + Sync;

/// One registered predicate plus its metadata
#[derive(Clone)]
pub struct PredicateEntry {
    name: String,
    predicate: Arc<PredicateFn>,
    arity: usize,
    narrows: bool,
    default_message: String,
}

impl PredicateEntry {
    /// Create an entry taking no extra arguments
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<bool, PredicateError> + Send + Sync + 'static,
    {
        let name = name.into();
        let default_message = format!("{{input}} failed {}", name);
        PredicateEntry {
            name,
            predicate: Arc::new(predicate),
            arity: 0,
            narrows: false,
            default_message,
        }
    }

    /// Number of extra arguments the predicate expects
    pub fn with_arity(mut self, arity: usize) -> Self {
        self.arity = arity;
        self
    }

    /// Mark the predicate as establishing the input's type when it passes
    pub fn narrowing(mut self) -> Self {
        self.narrows = true;
        self
    }

    /// Default failure message template (see [`render_template`])
    pub fn with_message(mut self, template: impl Into<String>) -> Self {
        self.default_message = template.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn narrows(&self) -> bool {
        self.narrows
    }

    pub fn default_message(&self) -> &str {
        &self.default_message
    }

    /// Run the predicate, enforcing its arity first
    pub fn evaluate(&self, input: &Value, args: &[Value]) -> Result<bool, PredicateError> {
        if args.len() != self.arity {
            return Err(PredicateError::Arity {
                expected: self.arity,
                actual: args.len(),
            });
        }
        contain_panic(|| (self.predicate)(input, args))
    }

    /// Default failure message rendered against one invocation
    pub fn render_default(&self, input: &Value, args: &[Value]) -> String {
        render_template(&self.default_message, input, args)
    }
}

/// Run predicate or override code, turning a panic into a [`PredicateError`]
pub fn contain_panic<T>(
    f: impl FnOnce() -> Result<T, PredicateError>,
) -> Result<T, PredicateError> {
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        let detail = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown cause".to_string());
        Err(PredicateError::Failed(format!("panicked: {}", detail)))
    })
}

impl fmt::Debug for PredicateEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateEntry")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("narrows", &self.narrows)
            .field("default_message", &self.default_message)
            .finish()
    }
}

/// Insertion-ordered predicate table with unique names
#[derive(Clone, Debug, Default)]
pub struct Registry {
    entries: Vec<PredicateEntry>,
    index: HashMap<String, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry; fails if the name is taken or malformed
    pub fn register(&mut self, entry: PredicateEntry) -> RegistryResult<()> {
        let name = entry.name();
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(RegistryError::InvalidName(name.to_string()));
        }
        if self.index.contains_key(name) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        self.index.insert(name.to_string(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&PredicateEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name())
    }

    pub fn iter(&self) -> impl Iterator<Item = &PredicateEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
