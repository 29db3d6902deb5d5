//! `waitUntil` - poll a producer until a guard passes
//!
//! Each tick invokes the producer, awaits its value and tests it with an
//! `assertWrap` member. A failed tick is followed by the timeout check and
//! then by a sleep of one interval, so a wait can overrun its timeout by up
//! to one interval.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde_json::Value;
use tokio::time::{sleep, Instant};
use tracing::{debug, trace, warn};
use warden_core::{AssertWrap, GuardResult, Guards, Member, Narrow, RegistryResult, TRUTHY_GUARD};

use crate::{WaitError, WaitOptions, WaitResult};

/// Values a producer may yield.
///
/// Infallible producers yield a [`Value`]; fallible ones yield a `Result`
/// whose error counts as a failed tick.
pub trait Produced {
    fn into_produced(self) -> Result<Value, String>;
}

impl Produced for Value {
    fn into_produced(self) -> Result<Value, String> {
        Ok(self)
    }
}

impl<E: fmt::Display> Produced for Result<Value, E> {
    fn into_produced(self) -> Result<Value, String> {
        self.map_err(|err| format!("producer failed: {}", err))
    }
}

/// Per-invocation retry state
struct RetryState {
    interval: Duration,
    timeout: Duration,
    started: Instant,
    attempts: u32,
    last_failure: Option<String>,
}

impl RetryState {
    fn new(options: &WaitOptions) -> Self {
        RetryState {
            interval: options.interval,
            timeout: options.timeout,
            started: Instant::now(),
            attempts: 0,
            last_failure: None,
        }
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn expired(&self) -> bool {
        self.elapsed() >= self.timeout
    }

    fn into_error(self, guard: &str) -> WaitError {
        WaitError::TimedOut {
            guard: guard.to_string(),
            timeout: self.timeout,
            elapsed: self.elapsed(),
            attempts: self.attempts,
            last_failure: self.last_failure.unwrap_or_default(),
        }
    }
}

/// The poll loop shared by every wait flavour
async fn poll<T, P, Fut>(
    guard: &str,
    options: &WaitOptions,
    mut producer: P,
    mut test: impl FnMut(Value) -> GuardResult<T>,
) -> WaitResult<T>
where
    P: FnMut() -> Fut,
    Fut: Future,
    Fut::Output: Produced,
{
    let mut state = RetryState::new(options);

    loop {
        state.attempts += 1;

        let failure = match producer().await.into_produced() {
            Ok(value) => match test(value) {
                Ok(passed) => {
                    debug!(
                        guard,
                        attempts = state.attempts,
                        elapsed = ?state.elapsed(),
                        "wait succeeded"
                    );
                    return Ok(passed);
                }
                Err(err) => err.to_string(),
            },
            Err(err) => err,
        };

        trace!(guard, attempt = state.attempts, failure = %failure, "poll failed");
        state.last_failure = Some(failure);

        if state.expired() {
            let err = state.into_error(guard);
            warn!(guard, error = %err, "wait timed out");
            return Err(err);
        }

        sleep(state.interval).await;
    }
}

/// Entry point: `waitUntil` over a guard table
#[derive(Clone, Debug)]
pub struct WaitUntil<'g> {
    guards: &'g Guards,
    options: WaitOptions,
    message: Option<String>,
}

impl WaitUntil<'static> {
    /// Wait on the built-in guard catalogue
    pub fn builtin() -> Self {
        Self::new(Guards::builtin())
    }
}

impl<'g> WaitUntil<'g> {
    pub fn new(guards: &'g Guards) -> Self {
        WaitUntil {
            guards,
            options: WaitOptions::default(),
            message: None,
        }
    }

    /// Options inherited by every member resolved afterwards
    pub fn with_options(mut self, options: WaitOptions) -> Self {
        self.options = options;
        self
    }

    /// Caller message prefixed to every failure explanation
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn options(&self) -> WaitOptions {
        self.options
    }

    /// Resolve a named guard to wait on
    pub fn member(&self, name: &str) -> RegistryResult<WaitMember<'g>> {
        let mut member = self.guards.assert_wrap().member(name)?;
        if let Some(message) = &self.message {
            member = member.message(message.clone());
        }
        Ok(WaitMember {
            member,
            args: Vec::new(),
            options: self.options,
        })
    }

    /// Wait until the produced value is truthy
    pub async fn truthy<P, Fut>(&self, producer: P) -> WaitResult<Value>
    where
        P: FnMut() -> Fut,
        Fut: Future,
        Fut::Output: Produced,
    {
        let mut group = self.guards.assert_wrap();
        if let Some(message) = &self.message {
            group = group.message(message.clone());
        }
        poll(TRUTHY_GUARD, &self.options, producer, |value| group.truthy(&value)).await
    }
}

/// A named guard bound to wait options and extra arguments
#[derive(Clone, Debug)]
pub struct WaitMember<'g> {
    member: Member<'g, AssertWrap>,
    args: Vec<Value>,
    options: WaitOptions,
}

impl<'g> WaitMember<'g> {
    pub fn name(&self) -> &'g str {
        self.member.name()
    }

    /// Extra arguments passed to the predicate on every tick
    pub fn args(mut self, args: impl Into<Vec<Value>>) -> Self {
        self.args = args.into();
        self
    }

    pub fn options(mut self, options: WaitOptions) -> Self {
        self.options = options;
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.member = self.member.message(message);
        self
    }

    /// Poll `producer` until the guard passes; resolves with the guard's
    /// wrapped value.
    pub async fn until<P, Fut>(&self, producer: P) -> WaitResult<Value>
    where
        P: FnMut() -> Fut,
        Fut: Future,
        Fut::Output: Produced,
    {
        poll(self.name(), &self.options, producer, |value| {
            self.member.call(&value, &self.args)
        })
        .await
    }

    /// Like [`until`](Self::until), narrowing the resolved value to `T`
    pub async fn until_as<T, P, Fut>(&self, producer: P) -> WaitResult<T>
    where
        T: Narrow,
        P: FnMut() -> Fut,
        Fut: Future,
        Fut::Output: Produced,
    {
        poll(self.name(), &self.options, producer, |value| {
            self.member.call_as::<T>(&value, &self.args)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn millis(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolves_immediately() {
        let start = Instant::now();
        let result = WaitUntil::builtin()
            .member("isString")
            .unwrap()
            .options(WaitOptions::from_millis(1, 100))
            .until(|| async { json!("x") })
            .await;

        assert_eq!(result, Ok(json!("x")));
        assert!(start.elapsed() < millis(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_within_one_interval() {
        let start = Instant::now();
        let err = WaitUntil::builtin()
            .member("isNumber")
            .unwrap()
            .options(WaitOptions::from_millis(1, 10))
            .until(|| async { json!("not a number") })
            .await
            .unwrap_err();

        let waited = start.elapsed();
        assert!(waited >= millis(10), "waited {:?}", waited);
        assert!(waited <= millis(11), "waited {:?}", waited);

        match err {
            WaitError::TimedOut {
                guard,
                attempts,
                last_failure,
                ..
            } => {
                assert_eq!(guard, "isNumber");
                assert!(attempts > 1);
                assert_eq!(last_failure, "\"not a number\" is not a number");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_overshoot_is_bounded_by_one_interval() {
        let options = WaitOptions::from_millis(30, 50);
        let start = Instant::now();
        let err = WaitUntil::builtin()
            .member("isNull")
            .unwrap()
            .options(options)
            .until(|| async { json!(1) })
            .await
            .unwrap_err();

        let waited = start.elapsed();
        assert!(waited > options.timeout);
        assert!(waited <= options.worst_case());
        assert!(err.is_timeout());
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolves_after_polling() {
        let mut polls = 0u32;
        let value = WaitUntil::builtin()
            .member("isAbove")
            .unwrap()
            .args(vec![json!(3)])
            .options(WaitOptions::from_millis(10, 1000))
            .until(|| {
                polls += 1;
                let current = polls;
                async move { json!(current) }
            })
            .await
            .unwrap();

        assert_eq!(value, json!(4));
        assert_eq!(polls, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_until_as_narrows() {
        let mut polls = 0u32;
        let name: String = WaitUntil::builtin()
            .with_options(WaitOptions::fast())
            .member("isString")
            .unwrap()
            .until_as(|| {
                polls += 1;
                let value = if polls < 3 { json!(null) } else { json!("ready") };
                std::future::ready(value)
            })
            .await
            .unwrap();

        assert_eq!(name, "ready");
    }

    #[tokio::test(start_paused = true)]
    async fn test_truthy_wait() {
        let mut values = vec![json!("ok"), json!(0), json!("")].into_iter();
        let value = WaitUntil::builtin()
            .with_options(WaitOptions::fast())
            .truthy(|| std::future::ready(values.next_back().unwrap_or(Value::Null)))
            .await
            .unwrap();
        assert_eq!(value, json!("ok"));

        let err = WaitUntil::builtin()
            .with_options(WaitOptions::from_millis(5, 20))
            .message("service flag")
            .truthy(|| async { json!(false) })
            .await
            .unwrap_err();
        assert_eq!(err.last_failure(), Some("service flag"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_producer_errors_count_as_failures() {
        let err = WaitUntil::builtin()
            .member("isString")
            .unwrap()
            .options(WaitOptions::from_millis(5, 20))
            .until(|| async { Err::<Value, _>("offline") })
            .await
            .unwrap_err();
        assert_eq!(err.last_failure(), Some("producer failed: offline"));

        let mut polls = 0u32;
        let value = WaitUntil::builtin()
            .member("isString")
            .unwrap()
            .options(WaitOptions::from_millis(5, 100))
            .until(|| {
                polls += 1;
                let result = if polls == 1 {
                    Err("warming up")
                } else {
                    Ok(json!("up"))
                };
                async move { result }
            })
            .await
            .unwrap();
        assert_eq!(value, json!("up"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_predicate_errors_are_retried_then_reported() {
        let err = WaitUntil::builtin()
            .member("isAbove")
            .unwrap()
            .args(vec![json!("three")])
            .options(WaitOptions::from_millis(5, 20))
            .until(|| async { json!(10) })
            .await
            .unwrap_err();
        assert!(err.last_failure().unwrap().contains("failed internally"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_member_message_prefixes_failure() {
        let err = WaitUntil::builtin()
            .with_options(WaitOptions::from_millis(5, 10))
            .member("hasKey")
            .unwrap()
            .args(vec![json!("port")])
            .message("config")
            .until(|| async { json!({}) })
            .await
            .unwrap_err();
        assert_eq!(
            err.last_failure(),
            Some("config: {} does not have key \"port\"")
        );
    }

    async fn wait_on_unknown() -> WaitResult<Value> {
        WaitUntil::builtin()
            .member("isSpaceship")?
            .until(|| async { json!(1) })
            .await
    }

    #[tokio::test]
    async fn test_unknown_member_is_a_setup_error() {
        let err = wait_on_unknown().await.unwrap_err();
        assert!(matches!(err, WaitError::Registry(_)));
        assert!(!err.is_timeout());
    }
}
