//! Guard groups derived from the predicate registry
//!
//! [`Guards`] owns a frozen [`Registry`] plus an override map. It hands out
//! one [`Group`] per guard kind; every group resolves the same member names
//! and shares one evaluation path, differing only in its [`Policy`].

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};

use serde_json::Value;
use tracing::{debug, trace};

use crate::{
    contain_panic, predicates, summarize, Assert, AssertWrap, Check, CheckWrap, FailureContext,
    FailureOutcome, GuardKind, Narrow, Policy, PredicateEntry, PredicateError, Registry,
    RegistryError, RegistryResult, Verdict,
};

/// Override signature: produces the value returned by the wrapping kinds
/// once the predicate has passed.
pub type WrapFn = dyn Fn(&Value, &[Value]) -> Result<Value, PredicateError> + Send + Sync;

/// Name reported by the standalone truthiness guard
pub const TRUTHY_GUARD: &str = "truthy";

/// Name reported by the callback-failure guard
pub const THROWS_GUARD: &str = "throws";

static BUILTIN: OnceLock<Guards> = OnceLock::new();

/// Truthiness of a guard input.
///
/// `null`, `false`, zero and the empty string are falsy; everything else,
/// including empty arrays and objects, is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Collects predicates and overrides, then freezes them into [`Guards`]
#[derive(Default)]
pub struct GuardsBuilder {
    registry: Registry,
    overrides: Vec<(String, Arc<WrapFn>)>,
}

impl GuardsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder preloaded with the built-in predicate catalogue
    pub fn with_builtins() -> RegistryResult<Self> {
        predicates::install(Self::new())
    }

    /// Register a predicate. Fails immediately on a duplicate name.
    pub fn register(mut self, entry: PredicateEntry) -> RegistryResult<Self> {
        self.registry.register(entry)?;
        Ok(self)
    }

    /// Replace the value the wrapping kinds return for `name`.
    ///
    /// The target must be registered by the time [`build`](Self::build) runs.
    pub fn override_wrap<F>(mut self, name: impl Into<String>, wrap: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value, PredicateError> + Send + Sync + 'static,
    {
        let wrap: Arc<WrapFn> = Arc::new(wrap);
        self.overrides.push((name.into(), wrap));
        self
    }

    /// Validate overrides and freeze the registry
    pub fn build(self) -> RegistryResult<Guards> {
        let mut overrides = HashMap::with_capacity(self.overrides.len());
        for (name, wrap) in self.overrides {
            if !self.registry.contains(&name) {
                return Err(RegistryError::UnknownOverride(name));
            }
            if overrides.contains_key(&name) {
                return Err(RegistryError::Duplicate(name));
            }
            overrides.insert(name, wrap);
        }

        debug!(
            guards = self.registry.len(),
            overrides = overrides.len(),
            "guards built"
        );

        Ok(Guards {
            registry: self.registry,
            overrides,
        })
    }
}

/// Frozen guard table exposing the four guard groups
pub struct Guards {
    registry: Registry,
    overrides: HashMap<String, Arc<WrapFn>>,
}

impl Guards {
    pub fn builder() -> GuardsBuilder {
        GuardsBuilder::new()
    }

    /// Process-wide guards backed by the built-in catalogue.
    ///
    /// Built on first use. A misconfigured catalogue is fatal.
    pub fn builtin() -> &'static Guards {
        BUILTIN.get_or_init(|| {
            match GuardsBuilder::with_builtins().and_then(GuardsBuilder::build) {
                Ok(guards) => guards,
                Err(err) => panic!("built-in guard catalogue is misconfigured: {}", err),
            }
        })
    }

    pub fn assert(&self) -> Group<'_, Assert> {
        self.group()
    }

    pub fn check(&self) -> Group<'_, Check> {
        self.group()
    }

    pub fn assert_wrap(&self) -> Group<'_, AssertWrap> {
        self.group()
    }

    pub fn check_wrap(&self) -> Group<'_, CheckWrap> {
        self.group()
    }

    /// Group for an arbitrary policy
    pub fn group<K: Policy>(&self) -> Group<'_, K> {
        Group {
            guards: self,
            context: FailureContext::default(),
            _kind: PhantomData,
        }
    }

    /// Member names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.registry.names()
    }

    pub fn entries(&self) -> impl Iterator<Item = &PredicateEntry> {
        self.registry.iter()
    }

    pub fn entry(&self, name: &str) -> Option<&PredicateEntry> {
        self.registry.get(name)
    }

    pub fn has_override(&self, name: &str) -> bool {
        self.overrides.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}

impl fmt::Debug for Guards {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut overrides: Vec<_> = self.overrides.keys().collect();
        overrides.sort();
        f.debug_struct("Guards")
            .field("names", &self.registry.names().collect::<Vec<_>>())
            .field("overrides", &overrides)
            .finish()
    }
}

/// Respond with a verdict whose payload is already known
fn settle<K: Policy, T>(verdict: Verdict<T>) -> K::Output<T> {
    match verdict {
        Verdict::Pass(value) => K::respond(Verdict::Pass(()), move || Verdict::Pass(value)),
        Verdict::Fail(failure) => {
            K::respond(Verdict::Fail(failure.clone()), move || Verdict::Fail(failure))
        }
        Verdict::Broken { name, error } => K::respond(
            Verdict::Broken {
                name: name.clone(),
                error: error.clone(),
            },
            move || Verdict::Broken { name, error },
        ),
    }
}

/// One guard kind applied to every registered predicate
#[derive(Clone, Debug)]
pub struct Group<'g, K> {
    guards: &'g Guards,
    context: FailureContext,
    _kind: PhantomData<K>,
}

impl<'g, K: Policy> Group<'g, K> {
    pub fn kind(&self) -> GuardKind {
        K::KIND
    }

    /// Caller message prefixed to every failure raised through this group
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.context.user_message = Some(message.into());
        self
    }

    /// Explanation replacing the default failure message
    pub fn because(mut self, explanation: impl Into<String>) -> Self {
        self.context.explanation = Some(explanation.into());
        self
    }

    /// Resolve a named member. Members inherit this group's context.
    pub fn member(&self, name: &str) -> RegistryResult<Member<'g, K>> {
        let entry = self
            .guards
            .registry
            .get(name)
            .ok_or_else(|| RegistryError::UnknownMember(name.to_string()))?;

        Ok(Member {
            entry,
            wrap: self.guards.overrides.get(name).map(|w| w.as_ref()),
            context: self.context.clone(),
            _kind: PhantomData,
        })
    }

    /// Standalone guard: applies this group's policy to the value's truthiness
    pub fn truthy(&self, value: &Value) -> K::Output<Value> {
        let verdict = if is_truthy(value) {
            Verdict::Pass(value.clone())
        } else {
            Verdict::Fail(FailureOutcome::new(
                TRUTHY_GUARD,
                summarize(value),
                None,
                &self.context,
            ))
        };
        settle::<K, _>(verdict)
    }

    /// Passes when `callback` fails. The wrapping kinds return the error.
    pub fn throws<T, E>(&self, callback: impl FnOnce() -> Result<T, E>) -> K::Output<E>
    where
        E: fmt::Display,
    {
        self.throws_inner(callback, None)
    }

    /// Like [`throws`](Self::throws), but the error text must contain `needle`
    pub fn throws_matching<T, E>(
        &self,
        callback: impl FnOnce() -> Result<T, E>,
        needle: &str,
    ) -> K::Output<E>
    where
        E: fmt::Display,
    {
        self.throws_inner(callback, Some(needle))
    }

    fn throws_inner<T, E>(
        &self,
        callback: impl FnOnce() -> Result<T, E>,
        needle: Option<&str>,
    ) -> K::Output<E>
    where
        E: fmt::Display,
    {
        let reason = match (callback(), needle) {
            (Err(err), None) => return settle::<K, _>(Verdict::Pass(err)),
            (Err(err), Some(needle)) => {
                let text = err.to_string();
                if text.contains(needle) {
                    return settle::<K, _>(Verdict::Pass(err));
                }
                format!("error {:?} does not contain {:?}", text, needle)
            }
            (Ok(_), _) => "callback did not fail".to_string(),
        };
        settle::<K, E>(Verdict::Fail(FailureOutcome::new(
            THROWS_GUARD,
            "callback",
            Some(reason),
            &self.context,
        )))
    }
}

/// A single predicate seen through one guard kind
#[derive(Clone)]
pub struct Member<'g, K> {
    entry: &'g PredicateEntry,
    wrap: Option<&'g WrapFn>,
    context: FailureContext,
    _kind: PhantomData<K>,
}

impl<'g, K: Policy> Member<'g, K> {
    pub fn name(&self) -> &'g str {
        self.entry.name()
    }

    pub fn entry(&self) -> &'g PredicateEntry {
        self.entry
    }

    pub fn kind(&self) -> GuardKind {
        K::KIND
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.context.user_message = Some(message.into());
        self
    }

    pub fn because(mut self, explanation: impl Into<String>) -> Self {
        self.context.explanation = Some(explanation.into());
        self
    }

    /// Invoke the guard. Wrapping kinds return the input (or the override's value).
    pub fn call(&self, input: &Value, args: &[Value]) -> K::Output<Value> {
        self.run(input, args, Verdict::Pass)
    }

    /// Invoke the guard and narrow the returned value to `T`.
    ///
    /// A value that passes the predicate but does not convert is treated as
    /// a failure.
    pub fn call_as<T: Narrow>(&self, input: &Value, args: &[Value]) -> K::Output<T> {
        self.run(input, args, |value| match T::narrow(&value) {
            Some(narrowed) => Verdict::Pass(narrowed),
            None => Verdict::Fail(self.failure(input, || {
                format!("{} is not a {}", summarize(&value), T::TYPE_NAME)
            })),
        })
    }

    fn run<T>(
        &self,
        input: &Value,
        args: &[Value],
        finish: impl FnOnce(Value) -> Verdict<T>,
    ) -> K::Output<T> {
        let verdict = match self.entry.evaluate(input, args) {
            Ok(true) => Verdict::Pass(()),
            Ok(false) => {
                Verdict::Fail(self.failure(input, || self.entry.render_default(input, args)))
            }
            Err(error) => Verdict::Broken {
                name: self.entry.name().to_string(),
                error,
            },
        };

        trace!(
            guard = self.entry.name(),
            kind = K::KIND.name(),
            passed = verdict.passed(),
            "guard evaluated"
        );

        K::respond(verdict, || {
            let value = match self.wrap {
                Some(wrap) => match contain_panic(|| wrap(input, args)) {
                    Ok(value) => value,
                    Err(error) => {
                        return Verdict::Broken {
                            name: self.entry.name().to_string(),
                            error,
                        }
                    }
                },
                None => input.clone(),
            };
            finish(value)
        })
    }

    /// Failure details; only rendered for kinds that report them
    fn failure(&self, input: &Value, reason: impl FnOnce() -> String) -> FailureOutcome {
        if !K::KIND.is_throwing() {
            return FailureOutcome::unreported(self.entry.name());
        }
        FailureOutcome::new(self.entry.name(), summarize(input), Some(reason()), &self.context)
    }
}

impl<K: Policy> fmt::Debug for Member<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("name", &self.entry.name())
            .field("kind", &K::KIND)
            .field("overridden", &self.wrap.is_some())
            .field("context", &self.context)
            .finish()
    }
}
