//! Failure message composition
//!
//! Every assertion failure is built from up to two parts:
//! - the reason: a caller-supplied explanation, or the predicate's default
//!   message rendered against the input
//! - the caller's own message, prefixed to the reason
//!
//! When both are missing the text falls back to [`GENERIC_FAILURE_MESSAGE`].

use std::io;

use serde_json::Value;

use crate::AssertionError;

/// Fallback text when no part of a failure message is available
pub const GENERIC_FAILURE_MESSAGE: &str = "Assertion failed.";

/// Separator between the caller's message and the reason
pub const MESSAGE_SEPARATOR: &str = ": ";

/// Input summaries longer than this many characters are truncated
pub const SUMMARY_LIMIT: usize = 80;

/// Join the non-empty parts of `[failure_message, explanation]`.
///
/// ```rust
/// use warden_core::combine_failure_message;
///
/// assert_eq!(combine_failure_message(Some("inner"), None), "inner");
/// assert_eq!(combine_failure_message(Some("inner"), Some("outer")), "outer: inner");
/// assert_eq!(combine_failure_message(Some(""), Some("")), "");
/// ```
pub fn combine_failure_message(explanation: Option<&str>, failure_message: Option<&str>) -> String {
    [failure_message, explanation]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(MESSAGE_SEPARATOR)
}

/// Byte sink that stops accepting input once `cap` bytes are buffered
struct Bounded {
    buf: Vec<u8>,
    cap: usize,
    overflowed: bool,
}

impl io::Write for Bounded {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        let room = self.cap - self.buf.len();
        if room == 0 {
            self.overflowed = true;
            return Err(io::Error::new(io::ErrorKind::WriteZero, "summary limit reached"));
        }
        let taken = room.min(bytes.len());
        self.buf.extend_from_slice(&bytes[..taken]);
        Ok(taken)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Compact single-line rendering of a guard input.
///
/// Serialization stops as soon as the summary is known to exceed
/// [`SUMMARY_LIMIT`], so large inputs are never rendered in full.
pub fn summarize(value: &Value) -> String {
    // a char is at most 4 bytes, so this always holds SUMMARY_LIMIT + 1 whole chars
    let mut sink = Bounded {
        buf: Vec::new(),
        cap: (SUMMARY_LIMIT + 1) * 4,
        overflowed: false,
    };
    if serde_json::to_writer(&mut sink, value).is_err() && !sink.overflowed {
        return String::new();
    }

    let rendered = String::from_utf8_lossy(&sink.buf);
    if !sink.overflowed && rendered.chars().count() <= SUMMARY_LIMIT {
        return rendered.into_owned();
    }
    let mut truncated: String = rendered.chars().take(SUMMARY_LIMIT).collect();
    truncated.push_str("...");
    truncated
}

/// Render a default-message template.
///
/// Supported placeholders: `{input}`, `{args}` (all extra arguments joined
/// with `", "`) and `{arg0}`, `{arg1}`, ... for individual arguments.
/// The template is scanned once; substituted text is never re-examined, and
/// unknown or unterminated placeholders are copied through unchanged.
pub fn render_template(template: &str, input: &Value, args: &[Value]) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        rendered.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            rendered.push_str(&rest[open..]);
            return rendered;
        };

        let key = &after[..close];
        match placeholder(key, input, args) {
            Some(text) => rendered.push_str(&text),
            None => {
                rendered.push('{');
                rendered.push_str(key);
                rendered.push('}');
            }
        }
        rest = &after[close + 1..];
    }

    rendered.push_str(rest);
    rendered
}

fn placeholder(key: &str, input: &Value, args: &[Value]) -> Option<String> {
    match key {
        "input" => Some(summarize(input)),
        "args" => Some(args.iter().map(summarize).collect::<Vec<_>>().join(", ")),
        _ => {
            let index: usize = key.strip_prefix("arg")?.parse().ok()?;
            args.get(index).map(summarize)
        }
    }
}

/// Caller-supplied parts of a failure message
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FailureContext {
    /// Replaces the predicate's default message
    pub explanation: Option<String>,
    /// Prefixed to the reason
    pub user_message: Option<String>,
}

impl FailureContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the explanation that replaces the default message
    pub fn because(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    /// Set the caller's own message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.user_message = Some(message.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.explanation.is_none() && self.user_message.is_none()
    }
}

/// Everything known about one failed guard invocation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailureOutcome {
    pub predicate_name: String,
    pub input_summary: String,
    pub explanation: Option<String>,
    pub user_message: Option<String>,
}

impl FailureOutcome {
    /// Build an outcome, letting the context's explanation win over `default_reason`
    pub fn new(
        predicate_name: impl Into<String>,
        input_summary: impl Into<String>,
        default_reason: Option<String>,
        context: &FailureContext,
    ) -> Self {
        FailureOutcome {
            predicate_name: predicate_name.into(),
            input_summary: input_summary.into(),
            explanation: context.explanation.clone().or(default_reason),
            user_message: context.user_message.clone(),
        }
    }

    /// Outcome for kinds that discard failure details
    pub fn unreported(predicate_name: impl Into<String>) -> Self {
        FailureOutcome {
            predicate_name: predicate_name.into(),
            input_summary: String::new(),
            explanation: None,
            user_message: None,
        }
    }

    /// Final assertion text
    pub fn message(&self) -> String {
        let combined =
            combine_failure_message(self.explanation.as_deref(), self.user_message.as_deref());
        if combined.is_empty() {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            combined
        }
    }

    pub fn into_error(self) -> AssertionError {
        AssertionError::new(self.message())
    }
}
