//! Warden Core - Predicate registry and derived guard kinds
//!
//! This crate turns one table of named predicates into four guard groups:
//! - `assert`: fail on a false predicate
//! - `check`: report the boolean
//! - `assertWrap`: return the validated value or fail
//! - `checkWrap`: return the validated value or `None`
//!
//! ```rust
//! use serde_json::json;
//! use warden_core::Guards;
//!
//! let guards = Guards::builtin();
//! let is_string = guards.assert_wrap().member("isString").unwrap();
//! assert_eq!(is_string.call(&json!("hi"), &[]).unwrap(), json!("hi"));
//! assert!(!guards.check().member("isNumber").unwrap().call(&json!("hi"), &[]));
//! ```

pub mod error;
pub mod guard;
pub mod kind;
pub mod message;
pub mod narrow;
pub mod predicates;
pub mod registry;

pub use error::*;
pub use guard::*;
pub use kind::*;
pub use message::*;
pub use narrow::*;
pub use registry::*;
