//! In-memory credential store.

use crate::error::{AuthError, AuthResult};
use crate::providers::CredentialStore;
use std::sync::{Arc, Mutex};

/// Credential store holding the token in memory.
///
/// Clones share the stored token. A failing store rejects every call.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialStore {
    token: Arc<Mutex<Option<String>>>,
    failing: bool,
}

impl InMemoryCredentialStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store already holding `token`.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Arc::new(Mutex::new(Some(token.into()))),
            failing: false,
        }
    }

    /// A store whose every operation fails.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            token: Arc::default(),
            failing: true,
        }
    }

    /// The stored token.
    #[must_use]
    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    pub fn token(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }

    fn check(&self) -> AuthResult<()> {
        if self.failing {
            Err(AuthError::CredentialStore("keychain unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

impl CredentialStore for InMemoryCredentialStore {
    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    async fn load_token(&self) -> AuthResult<Option<String>> {
        self.check()?;
        Ok(self.token.lock().unwrap().clone())
    }

    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    async fn save_token(&self, token: &str) -> AuthResult<()> {
        self.check()?;
        *self.token.lock().unwrap() = Some(token.to_string());
        Ok(())
    }

    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    async fn delete_token(&self) -> AuthResult<()> {
        self.check()?;
        self.token.lock().unwrap().take();
        Ok(())
    }
}
