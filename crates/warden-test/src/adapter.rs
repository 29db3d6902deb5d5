//! Test-framework adapters
//!
//! The runner never talks to a test framework directly. An adapter supplies
//! the three things it binds to: an assertion group, `it` and `force_it`.

use warden_core::{Assert, Group, Guards};

use crate::CaseResult;

/// Body of one registered case; receives the adapter's assertion group
pub type CaseBody<'a> = Box<dyn FnOnce(&Group<'_, Assert>) -> CaseResult<()> + 'a>;

/// The `assert` / `it` / `forceIt` triple
pub trait TestAdapter {
    /// Assertion group handed to every case body
    fn assert(&self) -> Group<'_, Assert>;

    /// Register (or run) a case
    fn it(&mut self, description: &str, body: CaseBody<'_>);

    /// Register a case that excludes all non-forced ones
    fn force_it(&mut self, description: &str, body: CaseBody<'_>);
}

/// Outcome of one case run by a [`RecordingAdapter`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaseOutcome {
    pub description: String,
    pub forced: bool,
    /// Failure text, `None` when the case passed
    pub failure: Option<String>,
}

impl CaseOutcome {
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

/// Summary of a recorded run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CaseReport {
    pub passed: usize,
    pub failed: usize,
    pub failures: Vec<CaseOutcome>,
}

impl CaseReport {
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed
    }
}

/// Adapter that runs each case immediately and records the outcome
#[derive(Debug)]
pub struct RecordingAdapter<'g> {
    guards: &'g Guards,
    outcomes: Vec<CaseOutcome>,
}

impl RecordingAdapter<'static> {
    /// Adapter asserting through the built-in guard catalogue
    pub fn builtin() -> Self {
        Self::new(Guards::builtin())
    }
}

impl<'g> RecordingAdapter<'g> {
    pub fn new(guards: &'g Guards) -> Self {
        RecordingAdapter {
            guards,
            outcomes: Vec::new(),
        }
    }

    pub fn outcomes(&self) -> &[CaseOutcome] {
        &self.outcomes
    }

    pub fn report(&self) -> CaseReport {
        let failures: Vec<_> = self
            .outcomes
            .iter()
            .filter(|o| !o.passed())
            .cloned()
            .collect();
        CaseReport {
            passed: self.outcomes.len() - failures.len(),
            failed: failures.len(),
            failures,
        }
    }

    fn record(&mut self, description: &str, body: CaseBody<'_>, forced: bool) {
        let failure = body(&self.assert()).err().map(|err| err.to_string());
        self.outcomes.push(CaseOutcome {
            description: description.to_string(),
            forced,
            failure,
        });
    }
}

impl TestAdapter for RecordingAdapter<'_> {
    fn assert(&self) -> Group<'_, Assert> {
        self.guards.assert()
    }

    fn it(&mut self, description: &str, body: CaseBody<'_>) {
        self.record(description, body, false);
    }

    fn force_it(&mut self, description: &str, body: CaseBody<'_>) {
        self.record(description, body, true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_recording_adapter_collects_outcomes() {
        let mut adapter = RecordingAdapter::builtin();

        adapter.it(
            "passes",
            Box::new(|assert| {
                assert.member("isString")?.call(&json!("x"), &[])?;
                Ok(())
            }),
        );
        adapter.force_it(
            "fails",
            Box::new(|assert| {
                assert.member("isString")?.call(&json!(1), &[])?;
                Ok(())
            }),
        );

        let report = adapter.report();
        assert_eq!(report.total(), 2);
        assert_eq!(report.passed, 1);
        assert!(!report.all_passed());
        assert_eq!(report.failures[0].description, "fails");
        assert!(report.failures[0].forced);
        assert_eq!(report.failures[0].failure.as_deref(), Some("1 is not a string"));
    }
}
