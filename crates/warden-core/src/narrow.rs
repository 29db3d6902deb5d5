//! Typed views of validated values
//!
//! A passing type predicate tells the caller what a value is; [`Narrow`]
//! turns that knowledge into a Rust type for the wrapping guard kinds.

use serde_json::{Map, Value};

/// Conversion from a guard input to a concrete Rust type
pub trait Narrow: Sized {
    /// Human-readable target name, used in failure messages
    const TYPE_NAME: &'static str;

    fn narrow(value: &Value) -> Option<Self>;
}

impl Narrow for Value {
    const TYPE_NAME: &'static str = "value";

    fn narrow(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl Narrow for String {
    const TYPE_NAME: &'static str = "string";

    fn narrow(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl Narrow for bool {
    const TYPE_NAME: &'static str = "boolean";

    fn narrow(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl Narrow for f64 {
    const TYPE_NAME: &'static str = "number";

    fn narrow(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl Narrow for i64 {
    const TYPE_NAME: &'static str = "integer";

    fn narrow(value: &Value) -> Option<Self> {
        value.as_i64()
    }
}

impl Narrow for u64 {
    const TYPE_NAME: &'static str = "unsigned integer";

    fn narrow(value: &Value) -> Option<Self> {
        value.as_u64()
    }
}

impl Narrow for Vec<Value> {
    const TYPE_NAME: &'static str = "array";

    fn narrow(value: &Value) -> Option<Self> {
        value.as_array().cloned()
    }
}

impl Narrow for Map<String, Value> {
    const TYPE_NAME: &'static str = "object";

    fn narrow(value: &Value) -> Option<Self> {
        value.as_object().cloned()
    }
}

impl Narrow for () {
    const TYPE_NAME: &'static str = "null";

    fn narrow(value: &Value) -> Option<Self> {
        value.as_null()
    }
}
