//! Mock authenticator.

use crate::providers::Authenticator;
use crate::schemas::{LoginRequest, LoginResponse};
use std::sync::{Arc, Mutex};
use storefront_remote::RemoteError;

/// Authenticator returning a fixed outcome and recording every request.
#[derive(Debug, Clone)]
pub struct MockAuthenticator {
    outcome: Result<LoginResponse, RemoteError>,
    requests: Arc<Mutex<Vec<LoginRequest>>>,
}

impl MockAuthenticator {
    /// Accept every login with `response`.
    #[must_use]
    pub fn accepting(response: LoginResponse) -> Self {
        Self {
            outcome: Ok(response),
            requests: Arc::default(),
        }
    }

    /// Reject every login with `message`.
    #[must_use]
    pub fn rejecting(message: &str) -> Self {
        Self {
            outcome: Err(RemoteError::mutation(message)),
            requests: Arc::default(),
        }
    }

    /// Requests received so far.
    #[must_use]
    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    pub fn requests(&self) -> Vec<LoginRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Authenticator for MockAuthenticator {
    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    async fn login(&self, request: LoginRequest) -> Result<LoginResponse, RemoteError> {
        self.requests.lock().unwrap().push(request);
        self.outcome.clone()
    }
}
