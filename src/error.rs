//! Error types for harmony
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (invalid task data, unknown id, bad input or config)
//! - 4: Operation failed (storage failure, remote API failure)

use thiserror::Error;

/// Exit codes for the harmony CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for harmony operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("{0}")]
    Validation(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Operation failures (exit code 4)
    #[error("{0}")]
    Persistence(String),

    #[error("API request failed with status {0}")]
    RequestFailed(u16),

    #[error("Network error: {0}")]
    Network(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors
            Error::Validation(_)
            | Error::TaskNotFound(_)
            | Error::InvalidConfig(_)
            | Error::InvalidArgument(_) => exit_codes::USER_ERROR,

            // Operation failures
            Error::Persistence(_)
            | Error::RequestFailed(_)
            | Error::Network(_)
            | Error::Io(_)
            | Error::Json(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Normalize a lower-level failure to [`Error::Persistence`] with a
    /// context prefix. The specific kinds (`Validation`, `TaskNotFound`)
    /// pass through untouched and are never downgraded to the generic kind.
    pub fn into_persistence(self, context: &str) -> Error {
        match self {
            Error::Validation(_) | Error::TaskNotFound(_) => self,
            other => Error::Persistence(format!("{context}: {other}")),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(err.to_string())
    }
}

/// Result type alias for harmony operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
        }
    }
}
