//! Error types for the remote-data accessors.

use crate::schema::{FieldPath, Violations};
use thiserror::Error;

/// Fallback message when a failure carries no text of its own
pub const CLIENT_SIDE_ERROR: &str = "Client Side Error!";

/// Result type alias for accessor operations.
pub type Result<T> = std::result::Result<T, RemoteError>;

/// Failure surfaced by a read or write accessor
///
/// Errors are `Clone` so one in-flight request can be shared by several
/// callers.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RemoteError {
    /// Non-2xx response or network failure
    #[error("Transport error{}: {message}", status_suffix(.status))]
    Transport {
        /// HTTP status, absent for network failures
        status: Option<u16>,
        /// Server-provided message when available
        message: String,
    },

    /// Response body does not satisfy the declared schema
    #[error("Validation error at {path}: {message}")]
    Validation {
        /// First violated field
        path: FieldPath,
        /// Message of the first violation
        message: String,
        /// Every violation found
        violations: Violations,
    },

    /// The caller-supplied write function failed
    #[error("{message}")]
    Mutation {
        /// Message of the underlying failure
        message: String,
    },
}

impl RemoteError {
    /// Build a validation error from a violation list
    #[must_use]
    pub fn validation(violations: Violations) -> Self {
        let (path, message) = violations.first().map_or_else(
            || (FieldPath::root(), "Invalid document".to_string()),
            |v| (v.path.clone(), v.message.clone()),
        );
        Self::Validation {
            path,
            message,
            violations,
        }
    }

    /// Wrap an arbitrary failure message from a write function
    #[must_use]
    pub fn mutation(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::Mutation {
            message: if message.trim().is_empty() {
                CLIENT_SIDE_ERROR.to_string()
            } else {
                message
            },
        }
    }

    /// Whether this is a transport error
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Whether this is a validation error
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// HTTP status of a transport error
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }

    /// Human readable message for display
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Transport { message, .. }
            | Self::Validation { message, .. }
            | Self::Mutation { message } => message,
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {s})")).unwrap_or_default()
}

/// Failure inside the HTTP layer itself
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// Could not reach the server or the connection dropped
    #[error("Request failed: {0}")]
    Network(String),

    /// The request timed out in the HTTP layer
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The success response body was not JSON
    #[error("Invalid JSON body: {0}")]
    InvalidBody(String),

    /// The request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<TransportFailure> for RemoteError {
    fn from(failure: TransportFailure) -> Self {
        Self::Transport {
            status: None,
            message: failure.to_string(),
        }
    }
}
