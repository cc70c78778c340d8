//! Secure credential storage trait.

use crate::error::AuthResult;

/// Key the access token is stored under.
pub const AUTH_TOKEN_KEY: &str = "authToken";

/// On-device secure storage for the access token.
///
/// Implementations wrap the platform keychain. A missing token is not an
/// error; only storage failures are.
pub trait CredentialStore: Send + Sync {
    /// Read the stored token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::CredentialStore`](crate::error::AuthError::CredentialStore)
    /// if the storage cannot be read.
    fn load_token(&self) -> impl std::future::Future<Output = AuthResult<Option<String>>> + Send;

    /// Replace the stored token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::CredentialStore`](crate::error::AuthError::CredentialStore)
    /// if the storage cannot be written.
    fn save_token(&self, token: &str) -> impl std::future::Future<Output = AuthResult<()>> + Send;

    /// Remove the stored token; succeeds when there is none.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::CredentialStore`](crate::error::AuthError::CredentialStore)
    /// if the storage cannot be written.
    fn delete_token(&self) -> impl std::future::Future<Output = AuthResult<()>> + Send;
}
