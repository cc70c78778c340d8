//! Error types for the client domain.

use storefront_remote::{RemoteError, Violations};
use thiserror::Error;

/// Configuration could not be loaded or is inconsistent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable holds a value that does not parse.
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidVariable {
        /// Variable name
        key: &'static str,
        /// Raw value found
        value: String,
        /// Parse failure
        reason: String,
    },

    /// The API base URL is empty or not http(s).
    #[error("Invalid API base URL: {0:?}")]
    InvalidBaseUrl(String),

    /// The page size is zero.
    #[error("Page size must be greater than zero")]
    ZeroPageSize,
}

/// Result type alias for authentication operations.
pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// Failures of the auth session.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AuthError {
    /// The login form is incomplete.
    #[error("{0}")]
    InvalidForm(Violations),

    /// The server rejected the credentials or could not be reached.
    #[error("{0}")]
    Rejected(String),

    /// A stored token has no readable payload.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Secure storage failed.
    #[error("Credential store error: {0}")]
    CredentialStore(String),
}

impl From<RemoteError> for AuthError {
    fn from(error: RemoteError) -> Self {
        Self::Rejected(error.message().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_remote::FieldPath;

    #[test]
    fn test_remote_error_keeps_server_message() {
        let error = AuthError::from(RemoteError::mutation("Invalid credentials"));
        assert_eq!(error, AuthError::Rejected("Invalid credentials".to_string()));
        assert_eq!(error.to_string(), "Invalid credentials");
    }

    #[test]
    fn test_invalid_form_renders_violations() {
        let violations = Violations::single(FieldPath::from_keys(["username"]), "Username is required.");
        let error = AuthError::InvalidForm(violations);
        assert_eq!(error.to_string(), "username: Username is required.");
    }
}
