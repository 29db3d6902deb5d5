//! Warden Wait - Retry scheduler for guards
//!
//! This crate implements `waitUntil`:
//! - Poll a producer on a fixed interval
//! - Test each produced value with any registered guard (or plain truthiness)
//! - Resolve with the first passing value, or fail once the timeout elapses
//!
//! Polling is strictly sequential and has no cancellation beyond the timeout.

pub mod error;
pub mod options;
pub mod wait;

pub use error::*;
pub use options::*;
pub use wait::*;
