//! Warden Test Harness - Table-driven test cases on top of Warden guards
//!
//! This crate provides:
//! - A test-framework adapter contract (`assert`, `it`, `force_it`)
//! - A recording adapter for running cases outside any framework
//! - A generic case runner with forced and excluded cases
//! - Test cases loadable from JSON

pub mod adapter;
pub mod cases;
pub mod error;

pub use adapter::*;
pub use cases::*;
pub use error::*;
