//! Table-driven test cases
//!
//! A [`TestCase`] describes one call of the function under test and what it
//! should do: return a value, or fail (optionally with a message fragment).
//! The [`CaseRunner`] registers every case with a [`TestAdapter`] and checks
//! expectations through the adapter's assertion group.

use std::fmt;
use std::slice;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use warden_core::{Assert, Group};

use crate::{CaseBody, CaseError, CaseResult, TestAdapter};

/// Expected behaviour of one call
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Expect {
    /// The call returns a value strictly equal to this one
    Output(Value),
    /// The call fails; if set, the error text must contain this fragment
    Throws(Option<String>),
}

/// One row of a case table
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TestCase {
    /// Case description
    pub it: String,
    /// Arguments passed to the function under test
    #[serde(default)]
    pub inputs: Vec<Value>,
    pub expect: Expect,
    /// When any case is forced, only forced cases run
    #[serde(default)]
    pub force: bool,
    /// Skip this case
    #[serde(default)]
    pub exclude: bool,
}

impl TestCase {
    pub fn new(it: impl Into<String>, inputs: Vec<Value>, expect: Expect) -> Self {
        TestCase {
            it: it.into(),
            inputs,
            expect,
            force: false,
            exclude: false,
        }
    }

    /// Case expecting `expected` as output
    pub fn output(it: impl Into<String>, inputs: Vec<Value>, expected: Value) -> Self {
        Self::new(it, inputs, Expect::Output(expected))
    }

    /// Case expecting a failure
    pub fn throws(it: impl Into<String>, inputs: Vec<Value>, fragment: Option<&str>) -> Self {
        Self::new(it, inputs, Expect::Throws(fragment.map(str::to_string)))
    }

    pub fn forced(mut self) -> Self {
        self.force = true;
        self
    }

    pub fn excluded(mut self) -> Self {
        self.exclude = true;
        self
    }
}

/// Parse a JSON array of cases
pub fn parse_cases(json: &str) -> CaseResult<Vec<TestCase>> {
    Ok(serde_json::from_str(json)?)
}

/// What a run registered
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Cases handed to the adapter
    pub registered: usize,
    /// Cases skipped because they were excluded or not forced
    pub skipped: usize,
    /// Whether forcing was in effect
    pub forced: bool,
}

/// Check one case's expectation
fn check_case<F, E>(assert: &Group<'_, Assert>, function: &F, case: &TestCase) -> CaseResult<()>
where
    F: Fn(&[Value]) -> Result<Value, E>,
    E: fmt::Display,
{
    match &case.expect {
        Expect::Output(expected) => {
            let actual =
                function(&case.inputs).map_err(|err| CaseError::Unexpected(err.to_string()))?;
            assert
                .member("strictEquals")?
                .call(&actual, slice::from_ref(expected))?;
        }
        Expect::Throws(None) => assert.throws(|| function(&case.inputs))?,
        Expect::Throws(Some(fragment)) => {
            assert.throws_matching(|| function(&case.inputs), fragment)?
        }
    }
    Ok(())
}

/// Runs case tables against a function through an adapter
pub struct CaseRunner<'a, A: TestAdapter> {
    adapter: &'a mut A,
}

impl<'a, A: TestAdapter> CaseRunner<'a, A> {
    pub fn new(adapter: &'a mut A) -> Self {
        CaseRunner { adapter }
    }

    /// Register every runnable case with the adapter
    pub fn run<F, E>(&mut self, function: F, cases: &[TestCase]) -> RunSummary
    where
        F: Fn(&[Value]) -> Result<Value, E>,
        E: fmt::Display,
    {
        let forced = cases.iter().any(|case| case.force);
        let mut summary = RunSummary {
            forced,
            ..Default::default()
        };

        for case in cases {
            if case.exclude || (forced && !case.force) {
                debug!(case = %case.it, "case skipped");
                summary.skipped += 1;
                continue;
            }

            let function = &function;
            let body: CaseBody<'_> = Box::new(move |assert| check_case(assert, function, case));
            if case.force {
                self.adapter.force_it(&case.it, body);
            } else {
                self.adapter.it(&case.it, body);
            }
            summary.registered += 1;
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecordingAdapter;
    use serde_json::json;

    fn parse_port(inputs: &[Value]) -> Result<Value, String> {
        let text = inputs
            .first()
            .and_then(Value::as_str)
            .ok_or_else(|| "expected a string".to_string())?;
        let port: u16 = text
            .parse()
            .map_err(|_| format!("invalid port {:?}", text))?;
        Ok(json!(port))
    }

    #[test]
    fn test_runs_all_cases() {
        let cases = vec![
            TestCase::output("parses a port", vec![json!("8080")], json!(8080)),
            TestCase::throws("rejects text", vec![json!("http")], Some("invalid port")),
            TestCase::throws("rejects missing input", vec![], None),
        ];

        let mut adapter = RecordingAdapter::builtin();
        let summary = CaseRunner::new(&mut adapter).run(parse_port, &cases);

        assert_eq!(summary.registered, 3);
        assert_eq!(summary.skipped, 0);
        assert!(!summary.forced);
        assert!(adapter.report().all_passed(), "{:?}", adapter.report());
    }

    #[test]
    fn test_failures_are_recorded() {
        let cases = vec![
            TestCase::output("wrong output", vec![json!("80")], json!(81)),
            TestCase::throws("does not fail", vec![json!("80")], None),
            TestCase::throws("wrong message", vec![json!("x")], Some("out of range")),
            TestCase::output("unexpected failure", vec![json!("x")], json!(1)),
        ];

        let mut adapter = RecordingAdapter::builtin();
        CaseRunner::new(&mut adapter).run(parse_port, &cases);

        let report = adapter.report();
        assert_eq!(report.failed, 4);
        let messages: Vec<_> = report
            .failures
            .iter()
            .map(|o| o.failure.clone().unwrap_or_default())
            .collect();
        assert_eq!(messages[0], "80 does not strictly equal 81");
        assert_eq!(messages[1], "callback did not fail");
        assert_eq!(
            messages[2],
            "error \"invalid port \\\"x\\\"\" does not contain \"out of range\""
        );
        assert_eq!(messages[3], "function failed unexpectedly: invalid port \"x\"");
    }

    #[test]
    fn test_forced_cases_exclude_the_rest() {
        let cases = vec![
            TestCase::output("skipped", vec![json!("1")], json!(1)),
            TestCase::output("forced", vec![json!("2")], json!(2)).forced(),
            TestCase::output("excluded", vec![json!("3")], json!(3)).excluded(),
        ];

        let mut adapter = RecordingAdapter::builtin();
        let summary = CaseRunner::new(&mut adapter).run(parse_port, &cases);

        assert!(summary.forced);
        assert_eq!(summary.registered, 1);
        assert_eq!(summary.skipped, 2);
        assert_eq!(adapter.outcomes().len(), 1);
        assert_eq!(adapter.outcomes()[0].description, "forced");
        assert!(adapter.outcomes()[0].forced);
    }

    #[test]
    fn test_parse_cases_from_json() {
        let cases = parse_cases(
            r#"[
                {"it": "parses", "inputs": ["443"], "expect": {"output": 443}},
                {"it": "rejects", "inputs": ["-1"], "expect": {"throws": "invalid"}, "force": true},
                {"it": "any failure", "expect": {"throws": null}, "exclude": true}
            ]"#,
        )
        .unwrap();

        assert_eq!(cases.len(), 3);
        assert_eq!(cases[0].expect, Expect::Output(json!(443)));
        assert_eq!(cases[1].expect, Expect::Throws(Some("invalid".to_string())));
        assert!(cases[1].force);
        assert!(cases[2].inputs.is_empty());
        assert!(cases[2].exclude);

        assert!(matches!(parse_cases("{}"), Err(CaseError::Parse(_))));
    }
}
