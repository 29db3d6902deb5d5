//! Built-in predicate catalogue
//!
//! Type checks, equality, numeric comparison, length, key and membership
//! checks over JSON-like values. Type checks narrow; comparisons take their
//! operands as extra arguments.

use serde_json::Value;

use crate::{GuardsBuilder, PredicateEntry, PredicateError, RegistryResult};

/// Guard whose wrapping kinds return the parsed document
pub const JSON_STRING_GUARD: &str = "isJsonString";

/// The plain type checks; all of them narrow
pub const TYPE_CHECKS: [&str; 7] = [
    "isString",
    "isNumber",
    "isInteger",
    "isBoolean",
    "isNull",
    "isArray",
    "isObject",
];

fn number_arg(args: &[Value], i: usize) -> Result<f64, PredicateError> {
    args.get(i).and_then(Value::as_f64).ok_or_else(|| {
        PredicateError::InvalidArgument(format!("argument {} must be a number", i))
    })
}

fn length_arg(args: &[Value], i: usize) -> Result<usize, PredicateError> {
    args.get(i)
        .and_then(Value::as_u64)
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| {
            PredicateError::InvalidArgument(format!("argument {} must be a non-negative integer", i))
        })
}

fn string_arg(args: &[Value], i: usize) -> Result<&str, PredicateError> {
    args.get(i).and_then(Value::as_str).ok_or_else(|| {
        PredicateError::InvalidArgument(format!("argument {} must be a string", i))
    })
}

/// Length of strings (in chars), arrays and objects
fn length_of(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        Value::Object(map) => Some(map.len()),
        _ => None,
    }
}

/// Compare the input against a numeric operand; non-numeric inputs fail
fn compare(
    input: &Value,
    args: &[Value],
    test: impl Fn(f64, f64) -> bool,
) -> Result<bool, PredicateError> {
    let operand = number_arg(args, 0)?;
    Ok(input.as_f64().map_or(false, |x| test(x, operand)))
}

/// Does `container` hold `element`? Arrays by element, objects by value,
/// strings by substring.
fn contains(container: &Value, element: &Value) -> bool {
    match (container, element) {
        (Value::Array(items), _) => items.contains(element),
        (Value::Object(map), _) => map.values().any(|v| v == element),
        (Value::String(haystack), Value::String(needle)) => haystack.contains(needle.as_str()),
        _ => false,
    }
}

/// The full catalogue in registration order
pub fn catalogue() -> Vec<PredicateEntry> {
    vec![
        // type checks
        PredicateEntry::new("isString", |v, _| Ok(v.is_string()))
            .narrowing()
            .with_message("{input} is not a string"),
        PredicateEntry::new("isNumber", |v, _| Ok(v.is_number()))
            .narrowing()
            .with_message("{input} is not a number"),
        PredicateEntry::new("isInteger", |v, _| Ok(v.is_i64() || v.is_u64()))
            .narrowing()
            .with_message("{input} is not an integer"),
        PredicateEntry::new("isBoolean", |v, _| Ok(v.is_boolean()))
            .narrowing()
            .with_message("{input} is not a boolean"),
        PredicateEntry::new("isNull", |v, _| Ok(v.is_null()))
            .narrowing()
            .with_message("{input} is not null"),
        PredicateEntry::new("isArray", |v, _| Ok(v.is_array()))
            .narrowing()
            .with_message("{input} is not an array"),
        PredicateEntry::new("isObject", |v, _| Ok(v.is_object()))
            .narrowing()
            .with_message("{input} is not an object"),
        // boolean literals
        PredicateEntry::new("isTrue", |v, _| Ok(v.as_bool() == Some(true)))
            .narrowing()
            .with_message("{input} is not true"),
        PredicateEntry::new("isFalse", |v, _| Ok(v.as_bool() == Some(false)))
            .narrowing()
            .with_message("{input} is not false"),
        // emptiness
        PredicateEntry::new("isEmpty", |v, _| Ok(length_of(v) == Some(0)))
            .with_message("{input} is not empty"),
        PredicateEntry::new("isNotEmpty", |v, _| Ok(length_of(v).map_or(false, |n| n > 0)))
            .with_message("{input} is empty"),
        // equality
        PredicateEntry::new("strictEquals", |v, args| Ok(*v == args[0]))
            .with_arity(1)
            .with_message("{input} does not strictly equal {arg0}"),
        PredicateEntry::new("notStrictEquals", |v, args| Ok(*v != args[0]))
            .with_arity(1)
            .with_message("{input} strictly equals {arg0}"),
        // numeric comparison
        PredicateEntry::new("isAbove", |v, args| compare(v, args, |x, n| x > n))
            .with_arity(1)
            .with_message("{input} is not above {arg0}"),
        PredicateEntry::new("isAtLeast", |v, args| compare(v, args, |x, n| x >= n))
            .with_arity(1)
            .with_message("{input} is not at least {arg0}"),
        PredicateEntry::new("isBelow", |v, args| compare(v, args, |x, n| x < n))
            .with_arity(1)
            .with_message("{input} is not below {arg0}"),
        PredicateEntry::new("isAtMost", |v, args| compare(v, args, |x, n| x <= n))
            .with_arity(1)
            .with_message("{input} is not at most {arg0}"),
        PredicateEntry::new("isApproximately", |v, args| {
            let expected = number_arg(args, 0)?;
            let delta = number_arg(args, 1)?;
            if delta < 0.0 {
                return Err(PredicateError::InvalidArgument(
                    "delta must not be negative".to_string(),
                ));
            }
            Ok(v.as_f64().map_or(false, |x| (x - expected).abs() <= delta))
        })
        .with_arity(2)
        .with_message("{input} is not within {arg1} of {arg0}"),
        // length
        PredicateEntry::new("isLengthAtLeast", |v, args| {
            let min = length_arg(args, 0)?;
            Ok(length_of(v).map_or(false, |n| n >= min))
        })
        .with_arity(1)
        .with_message("{input} is shorter than {arg0}"),
        PredicateEntry::new("isLengthExactly", |v, args| {
            let exact = length_arg(args, 0)?;
            Ok(length_of(v) == Some(exact))
        })
        .with_arity(1)
        .with_message("{input} does not have length {arg0}"),
        // keys
        PredicateEntry::new("hasKey", |v, args| {
            let key = string_arg(args, 0)?;
            Ok(v.as_object().map_or(false, |map| map.contains_key(key)))
        })
        .with_arity(1)
        .with_message("{input} does not have key {arg0}"),
        PredicateEntry::new("lacksKey", |v, args| {
            let key = string_arg(args, 0)?;
            Ok(v.as_object().map_or(false, |map| !map.contains_key(key)))
        })
        .with_arity(1)
        .with_message("{input} has key {arg0}"),
        // membership
        PredicateEntry::new("isIn", |v, args| Ok(contains(&args[0], v)))
            .with_arity(1)
            .with_message("{input} is not in {arg0}"),
        PredicateEntry::new("includes", |v, args| Ok(contains(v, &args[0])))
            .with_arity(1)
            .with_message("{input} does not include {arg0}"),
        // strings
        PredicateEntry::new("startsWith", |v, args| {
            let prefix = string_arg(args, 0)?;
            Ok(v.as_str().map_or(false, |s| s.starts_with(prefix)))
        })
        .with_arity(1)
        .with_message("{input} does not start with {arg0}"),
        PredicateEntry::new("endsWith", |v, args| {
            let suffix = string_arg(args, 0)?;
            Ok(v.as_str().map_or(false, |s| s.ends_with(suffix)))
        })
        .with_arity(1)
        .with_message("{input} does not end with {arg0}"),
        PredicateEntry::new(JSON_STRING_GUARD, |v, _| {
            Ok(v.as_str()
                .map_or(false, |s| serde_json::from_str::<Value>(s).is_ok()))
        })
        .with_message("{input} is not a JSON string"),
    ]
}

/// Parse the input of a passing `isJsonString`
fn parse_json_string(input: &Value, _args: &[Value]) -> Result<Value, PredicateError> {
    let text = input
        .as_str()
        .ok_or_else(|| PredicateError::Failed("input is not a string".to_string()))?;
    serde_json::from_str(text).map_err(|err| PredicateError::Failed(err.to_string()))
}

/// Register the catalogue and its overrides on `builder`
pub fn install(builder: GuardsBuilder) -> RegistryResult<GuardsBuilder> {
    let builder = catalogue()
        .into_iter()
        .try_fold(builder, |builder, entry| builder.register(entry))?;
    Ok(builder.override_wrap(JSON_STRING_GUARD, parse_json_string))
}
