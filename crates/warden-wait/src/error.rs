//! Error types for waiting on guards

use std::time::Duration;

use thiserror::Error;
use warden_core::RegistryError;

/// Wait errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WaitError {
    #[error("Timed out after {elapsed:?} waiting for {guard} ({attempts} attempts, timeout {timeout:?}): {last_failure}")]
    TimedOut {
        guard: String,
        timeout: Duration,
        elapsed: Duration,
        attempts: u32,
        /// Explanation of the final failed poll
        last_failure: String,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl WaitError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, WaitError::TimedOut { .. })
    }

    /// Explanation of the final failed poll, if this was a timeout
    pub fn last_failure(&self) -> Option<&str> {
        match self {
            WaitError::TimedOut { last_failure, .. } => Some(last_failure),
            WaitError::Registry(_) => None,
        }
    }
}

/// Result type for wait operations
pub type WaitResult<T> = Result<T, WaitError>;
