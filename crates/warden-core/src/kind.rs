//! Guard kinds and their response policies
//!
//! Every registered predicate is exposed through four kinds:
//! - Assert: fails on a false predicate, returns nothing
//! - Check: returns the boolean, never fails
//! - AssertWrap: returns the validated value or fails
//! - CheckWrap: returns the validated value or `None`
//!
//! A kind only decides what to do with a [`Verdict`]; it never evaluates a
//! predicate itself, so all four agree on what passes.

use crate::{FailureOutcome, GuardError, GuardResult, PredicateError};

/// Response policy tag
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GuardKind {
    Assert,
    Check,
    AssertWrap,
    CheckWrap,
}

impl GuardKind {
    pub const ALL: [GuardKind; 4] = [
        GuardKind::Assert,
        GuardKind::Check,
        GuardKind::AssertWrap,
        GuardKind::CheckWrap,
    ];

    /// Group name as exposed to callers
    pub fn name(self) -> &'static str {
        match self {
            GuardKind::Assert => "assert",
            GuardKind::Check => "check",
            GuardKind::AssertWrap => "assertWrap",
            GuardKind::CheckWrap => "checkWrap",
        }
    }

    /// Does this kind report failures as errors?
    pub fn is_throwing(self) -> bool {
        matches!(self, GuardKind::Assert | GuardKind::AssertWrap)
    }

    /// Does this kind hand the validated value back?
    pub fn returns_value(self) -> bool {
        matches!(self, GuardKind::AssertWrap | GuardKind::CheckWrap)
    }
}

/// Result of evaluating a predicate once
#[derive(Clone, Debug, PartialEq)]
pub enum Verdict<T> {
    Pass(T),
    Fail(FailureOutcome),
    /// The predicate itself errored
    Broken { name: String, error: PredicateError },
}

impl<T> Verdict<T> {
    pub fn passed(&self) -> bool {
        matches!(self, Verdict::Pass(_))
    }

    /// Shape used by the throwing kinds
    pub fn into_result(self) -> GuardResult<T> {
        match self {
            Verdict::Pass(value) => Ok(value),
            Verdict::Fail(failure) => Err(GuardError::Assertion(failure.into_error())),
            Verdict::Broken { name, error } => Err(GuardError::Predicate {
                name,
                source: error,
            }),
        }
    }
}

/// A response policy: a pure mapping from a verdict to the caller-facing output.
///
/// `wrap` produces the value handed back on success. Only the wrapping kinds
/// call it, and it may still reject (for example when the value does not
/// narrow to the requested type).
pub trait Policy {
    const KIND: GuardKind;

    type Output<T>;

    fn respond<T>(verdict: Verdict<()>, wrap: impl FnOnce() -> Verdict<T>) -> Self::Output<T>;
}

/// Marker for the `assert` group
#[derive(Clone, Copy, Debug, Default)]
pub struct Assert;

/// Marker for the `check` group
#[derive(Clone, Copy, Debug, Default)]
pub struct Check;

/// Marker for the `assertWrap` group
#[derive(Clone, Copy, Debug, Default)]
pub struct AssertWrap;

/// Marker for the `checkWrap` group
#[derive(Clone, Copy, Debug, Default)]
pub struct CheckWrap;

impl Policy for Assert {
    const KIND: GuardKind = GuardKind::Assert;

    type Output<T> = GuardResult<()>;

    fn respond<T>(verdict: Verdict<()>, _wrap: impl FnOnce() -> Verdict<T>) -> GuardResult<()> {
        verdict.into_result()
    }
}

impl Policy for Check {
    const KIND: GuardKind = GuardKind::Check;

    type Output<T> = bool;

    fn respond<T>(verdict: Verdict<()>, _wrap: impl FnOnce() -> Verdict<T>) -> bool {
        verdict.passed()
    }
}

impl Policy for AssertWrap {
    const KIND: GuardKind = GuardKind::AssertWrap;

    type Output<T> = GuardResult<T>;

    fn respond<T>(verdict: Verdict<()>, wrap: impl FnOnce() -> Verdict<T>) -> GuardResult<T> {
        verdict.into_result()?;
        wrap().into_result()
    }
}

impl Policy for CheckWrap {
    const KIND: GuardKind = GuardKind::CheckWrap;

    type Output<T> = Option<T>;

    fn respond<T>(verdict: Verdict<()>, wrap: impl FnOnce() -> Verdict<T>) -> Option<T> {
        if !verdict.passed() {
            return None;
        }
        match wrap() {
            Verdict::Pass(value) => Some(value),
            _ => None,
        }
    }
}
