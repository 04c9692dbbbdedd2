//! CLI error types.

use kc_admin_client::AdminError;
use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Login against the token endpoint failed.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Admin API failure.
    #[error(transparent)]
    Admin(#[from] AdminError),

    /// Validation error.
    #[error("validation error: {0}")]
    Validation(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl CliError {
    /// Process exit code for this error.
    ///
    /// A partially applied role change exits with 2 so scripts can tell it
    /// apart from a change that never happened.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Admin(AdminError::ReconciliationPartialFailure { .. }) => 2,
            _ => 1,
        }
    }
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
