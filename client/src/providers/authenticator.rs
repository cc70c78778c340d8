//! Credential exchange trait.

use crate::schemas::{LoginRequest, LoginResponse};
use storefront_remote::RemoteError;

/// Exchanges a username and password for tokens.
pub trait Authenticator: Send + Sync {
    /// Log in once; never retried.
    ///
    /// # Errors
    ///
    /// Returns the [`RemoteError`] of the login write.
    fn login(
        &self,
        request: LoginRequest,
    ) -> impl std::future::Future<Output = Result<LoginResponse, RemoteError>> + Send;
}
