//! Error types for test-case runs

use thiserror::Error;
use warden_core::{GuardError, RegistryError};

/// Why a single test case failed
#[derive(Error, Debug)]
pub enum CaseError {
    #[error(transparent)]
    Guard(#[from] GuardError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("function failed unexpectedly: {0}")]
    Unexpected(String),

    #[error("invalid test cases: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for test-case operations
pub type CaseResult<T> = Result<T, CaseError>;
