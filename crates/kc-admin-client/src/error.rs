//! Admin client error types.
//!
//! HTTP failures are classified into a small taxonomy so callers branch on
//! meaning rather than on raw status codes.

use thiserror::Error;

/// Errors returned by Admin API operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// The bearer credential could not be refreshed.
    ///
    /// Unrecoverable for the current operation; the user has to
    /// re-authenticate.
    #[error("session expired: {0}")]
    AuthExpired(String),

    /// HTTP 403: the caller lacks the required capability grant.
    #[error("access denied: {body}")]
    Forbidden {
        /// Raw response body.
        body: String,
    },

    /// HTTP 409: the resource already exists or is in a conflicting state.
    #[error("conflict: {body}")]
    Conflict {
        /// Raw response body.
        body: String,
    },

    /// HTTP 404.
    #[error("not found: {path}")]
    NotFound {
        /// Request path that produced the 404.
        path: String,
    },

    /// Any other non-2xx status.
    #[error("API error: {status} - {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// One of the grant/revoke calls succeeded and the other did not.
    ///
    /// The subject is left in a mixed state; re-reading the assignments and
    /// reconciling again converges on the target.
    #[error("role reconciliation partially applied ({applied} succeeded, {failed} failed): {source}")]
    ReconciliationPartialFailure {
        /// The step that was applied.
        applied: ReconcileStep,
        /// The step that failed.
        failed: ReconcileStep,
        /// Why the failed step failed.
        #[source]
        source: Box<AdminError>,
    },

    /// Role names with no catalog entry under a failing policy.
    #[error("unknown roles: {}", .0.join(", "))]
    UnknownRoles(Vec<String>),

    /// A success response carried a body that is not what the endpoint documents.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Invalid client configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Connection-level failure.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A success response body could not be decoded.
    #[error("JSON error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// One half of a role reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileStep {
    /// Adding role mappings.
    Grant,
    /// Removing role mappings.
    Revoke,
}

impl std::fmt::Display for ReconcileStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Grant => f.write_str("grant"),
            Self::Revoke => f.write_str("revoke"),
        }
    }
}

impl AdminError {
    /// Classifies a non-2xx response.
    #[must_use]
    pub fn from_status(status: u16, path: &str, body: String) -> Self {
        match status {
            403 => Self::Forbidden { body },
            404 => Self::NotFound {
                path: path.to_string(),
            },
            409 => Self::Conflict { body },
            _ => Self::Api { status, body },
        }
    }

    /// Returns the HTTP status this error was classified from, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Forbidden { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::Conflict { .. } => Some(409),
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns whether the user must re-authenticate.
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self, Self::AuthExpired(_))
    }

    /// Returns whether this is a 404.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type for Admin API operations.
pub type AdminResult<T> = Result<T, AdminError>;
