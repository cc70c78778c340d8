//! Auth session reducer.
//!
//! The session is backed by an access token kept in a [`CredentialStore`].
//! On startup [`AuthAction::RestoreSession`] reads the token back and decodes
//! its JWT payload. The signature is not checked; the server does that on
//! every authenticated request.

use crate::error::{AuthError, AuthResult};
use crate::forms::LoginForm;
use crate::providers::{Authenticator, CredentialStore};
use crate::schemas::{LoginRequest, LoginResponse};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use storefront_core::environment::Clock;
use storefront_core::{DateTime, SmallVec, Utc, effect::Effect, reducer::Reducer, smallvec};

/// The signed-in user as carried in the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    /// User id
    pub id: u64,
    /// Username
    pub username: String,
    /// Email
    #[serde(default)]
    pub email: String,
    /// First name
    #[serde(default)]
    pub first_name: String,
    /// Last name
    #[serde(default)]
    pub last_name: String,
    /// Gender
    #[serde(default)]
    pub gender: String,
    /// Avatar URL
    #[serde(default)]
    pub image: String,
}

impl From<&LoginResponse> for SessionUser {
    fn from(response: &LoginResponse) -> Self {
        Self {
            id: response.id,
            username: response.username.clone(),
            email: response.email.clone(),
            first_name: response.first_name.clone(),
            last_name: response.last_name.clone(),
            gender: response.gender.clone(),
            image: response.image.clone(),
        }
    }
}

/// Decoded payload of an access token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenClaims {
    /// User fields
    #[serde(flatten)]
    pub user: SessionUser,
    /// Issued at, seconds since the epoch
    #[serde(default)]
    pub iat: Option<i64>,
    /// Expiry, seconds since the epoch
    #[serde(default)]
    pub exp: Option<i64>,
}

impl TokenClaims {
    /// When the token was issued.
    #[must_use]
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.iat.and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// When the token stops being accepted.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// Whether the token has expired at `now`. Tokens without `exp` never do.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|expiry| expiry <= now)
    }
}

/// Decode the payload segment of a JWT.
///
/// # Errors
///
/// Returns [`AuthError::InvalidToken`] if the token does not have three
/// segments or its payload is not base64url-encoded JSON with a user.
pub fn decode_token(token: &str) -> AuthResult<TokenClaims> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(AuthError::InvalidToken("expected three segments".to_string()));
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| AuthError::InvalidToken(e.to_string()))
}

/// A signed-in session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Access token sent as the bearer credential
    pub token: String,
    /// Refresh token; only known right after a login
    pub refresh_token: Option<String>,
    /// Signed-in user
    pub user: SessionUser,
    /// When the session started
    pub signed_in_at: DateTime<Utc>,
}

/// Auth state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    /// Current session, if signed in
    pub session: Option<Session>,
    /// A restore, login or logout is in flight
    pub is_loading: bool,
    /// Last login failure
    pub error: Option<AuthError>,
}

impl AuthState {
    /// Signed-out state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a session is active.
    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    /// The signed-in user.
    #[must_use]
    pub fn user(&self) -> Option<&SessionUser> {
        self.session.as_ref().map(|session| &session.user)
    }
}

/// Auth actions.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthAction {
    // Commands
    /// Read the stored token back into a session
    RestoreSession,

    /// Submit the login form
    Login(LoginForm),

    /// Forget the session and its stored token
    Logout,

    // Events
    /// The stored token was read; `None` when there is no usable token
    SessionRestored(Option<Session>),

    /// Credentials accepted and token stored
    LoginSucceeded(Session),

    /// The form was invalid, the server refused, or the token could not be stored
    LoginFailed(AuthError),

    /// Stored token removed
    LoggedOut,
}

/// Auth environment.
#[derive(Debug, Clone)]
pub struct AuthEnvironment<C, A, K>
where
    C: CredentialStore + Clone,
    A: Authenticator + Clone,
    K: Clock + Clone,
{
    /// Token storage
    pub credentials: C,
    /// Login endpoint
    pub authenticator: A,
    /// Time source for session timestamps and expiry
    pub clock: K,
}

impl<C, A, K> AuthEnvironment<C, A, K>
where
    C: CredentialStore + Clone,
    A: Authenticator + Clone,
    K: Clock + Clone,
{
    /// Create an environment.
    #[must_use]
    pub const fn new(credentials: C, authenticator: A, clock: K) -> Self {
        Self {
            credentials,
            authenticator,
            clock,
        }
    }
}

/// Auth reducer.
#[derive(Debug, Clone)]
pub struct AuthReducer<C, A, K> {
    _phantom: std::marker::PhantomData<(C, A, K)>,
}

impl<C, A, K> AuthReducer<C, A, K> {
    /// Create a new auth reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<C, A, K> Default for AuthReducer<C, A, K> {
    fn default() -> Self {
        Self::new()
    }
}

async fn restore<C: CredentialStore, K: Clock>(credentials: &C, clock: &K) -> Option<Session> {
    let token = match credentials.load_token().await {
        Ok(Some(token)) => token,
        Ok(None) => return None,
        Err(error) => {
            tracing::warn!(error = %error, "Could not read stored token");
            return None;
        },
    };

    let claims = match decode_token(&token) {
        Ok(claims) => claims,
        Err(error) => {
            tracing::warn!(error = %error, "Stored token is unreadable");
            return None;
        },
    };

    let now = clock.now();
    if claims.is_expired(now) {
        tracing::debug!(user_id = claims.user.id, "Stored token expired");
        return None;
    }

    Some(Session {
        signed_in_at: claims.issued_at().unwrap_or(now),
        user: claims.user,
        refresh_token: None,
        token,
    })
}

impl<C, A, K> Reducer for AuthReducer<C, A, K>
where
    C: CredentialStore + Clone + 'static,
    A: Authenticator + Clone + 'static,
    K: Clock + Clone + 'static,
{
    type State = AuthState;
    type Action = AuthAction;
    type Environment = AuthEnvironment<C, A, K>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ═══════════════════════════════════════════════════════════════
            // Restore
            // ═══════════════════════════════════════════════════════════════
            AuthAction::RestoreSession => {
                state.is_loading = true;
                let credentials = env.credentials.clone();
                let clock = env.clock.clone();

                smallvec![Effect::Future(Box::pin(async move {
                    Some(AuthAction::SessionRestored(restore(&credentials, &clock).await))
                }))]
            },

            AuthAction::SessionRestored(session) => {
                tracing::debug!(signed_in = session.is_some(), "Session restored");
                state.is_loading = false;
                state.session = session;
                SmallVec::new()
            },

            // ═══════════════════════════════════════════════════════════════
            // Login
            // ═══════════════════════════════════════════════════════════════
            AuthAction::Login(form) => {
                if state.is_loading {
                    tracing::trace!("Auth request in flight; Login ignored");
                    return SmallVec::new();
                }
                if let Err(violations) = form.validate() {
                    return self.reduce(
                        state,
                        AuthAction::LoginFailed(AuthError::InvalidForm(violations)),
                        env,
                    );
                }

                state.is_loading = true;
                state.error = None;

                let request = LoginRequest {
                    username: form.username,
                    password: form.password,
                };
                let credentials = env.credentials.clone();
                let authenticator = env.authenticator.clone();
                let clock = env.clock.clone();

                smallvec![Effect::Future(Box::pin(async move {
                    let response = match authenticator.login(request).await {
                        Ok(response) => response,
                        Err(error) => return Some(AuthAction::LoginFailed(error.into())),
                    };

                    if let Err(error) = credentials.save_token(&response.access_token).await {
                        return Some(AuthAction::LoginFailed(error));
                    }

                    Some(AuthAction::LoginSucceeded(Session {
                        user: SessionUser::from(&response),
                        token: response.access_token,
                        refresh_token: Some(response.refresh_token),
                        signed_in_at: clock.now(),
                    }))
                }))]
            },

            AuthAction::LoginSucceeded(session) => {
                tracing::info!(user_id = session.user.id, "Signed in");
                state.is_loading = false;
                state.error = None;
                state.session = Some(session);
                SmallVec::new()
            },

            AuthAction::LoginFailed(error) => {
                tracing::debug!(error = %error, "Login failed");
                state.is_loading = false;
                state.error = Some(error);
                SmallVec::new()
            },

            // ═══════════════════════════════════════════════════════════════
            // Logout
            // ═══════════════════════════════════════════════════════════════
            AuthAction::Logout => {
                state.session = None;
                state.error = None;
                state.is_loading = true;
                let credentials = env.credentials.clone();

                smallvec![Effect::Future(Box::pin(async move {
                    if let Err(error) = credentials.delete_token().await {
                        tracing::warn!(error = %error, "Could not delete stored token");
                    }
                    Some(AuthAction::LoggedOut)
                }))]
            },

            AuthAction::LoggedOut => {
                tracing::info!("Signed out");
                state.is_loading = false;
                state.session = None;
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{InMemoryCredentialStore, MockAuthenticator};
    use serde_json::json;
    use storefront_testing::{FixedClock, ReducerTest, assertions, test_clock};

    type Auth = AuthReducer<InMemoryCredentialStore, MockAuthenticator, FixedClock>;

    /// A JWT for emilys with the given claims; the signature is junk.
    fn token_for(exp: Option<i64>) -> String {
        let mut payload = json!({
            "id": 1,
            "username": "emilys",
            "email": "emily.johnson@x.dummyjson.com",
            "firstName": "Emily",
            "lastName": "Johnson",
            "gender": "female",
            "image": "https://dummyjson.com/icon/emilys/128",
            "iat": 1_735_689_600_i64
        });
        if let Some(exp) = exp {
            payload["exp"] = json!(exp);
        }
        format!(
            "{}.{}.signature",
            URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(payload.to_string())
        )
    }

    fn login_response() -> LoginResponse {
        LoginResponse {
            id: 1,
            username: "emilys".to_string(),
            email: "emily.johnson@x.dummyjson.com".to_string(),
            first_name: "Emily".to_string(),
            last_name: "Johnson".to_string(),
            gender: "female".to_string(),
            image: "https://dummyjson.com/icon/emilys/128".to_string(),
            access_token: token_for(None),
            refresh_token: "refresh".to_string(),
        }
    }

    fn env(
        credentials: InMemoryCredentialStore,
    ) -> AuthEnvironment<InMemoryCredentialStore, MockAuthenticator, FixedClock> {
        AuthEnvironment::new(
            credentials,
            MockAuthenticator::accepting(login_response()),
            test_clock(),
        )
    }

    fn session() -> Session {
        Session {
            token: token_for(None),
            refresh_token: None,
            user: SessionUser::from(&login_response()),
            signed_in_at: test_clock().now(),
        }
    }

    #[test]
    fn test_decode_token_reads_user() {
        let claims = decode_token(&token_for(Some(1_735_693_200))).unwrap();
        assert_eq!(claims.user.username, "emilys");
        assert_eq!(claims.user.first_name, "Emily");
        assert_eq!(claims.issued_at(), DateTime::from_timestamp(1_735_689_600, 0));
        assert!(!claims.is_expired(test_clock().now()));
        assert!(claims.is_expired(DateTime::from_timestamp(1_735_693_200, 0).unwrap()));
    }

    #[test]
    fn test_decode_token_rejects_malformed_tokens() {
        for token in ["", "abc", "a.b", "a.b.c.d", "a.!!!.c"] {
            assert!(
                matches!(decode_token(token), Err(AuthError::InvalidToken(_))),
                "{token:?} should be rejected"
            );
        }
        let not_a_user = format!("h.{}.s", URL_SAFE_NO_PAD.encode(br#"{"sub":"x"}"#));
        assert!(decode_token(&not_a_user).is_err());
    }

    #[test]
    fn test_invalid_login_form_fails_without_request() {
        let env = env(InMemoryCredentialStore::new());
        let authenticator = env.authenticator.clone();

        ReducerTest::new(Auth::new())
            .with_env(env)
            .given_state(AuthState::new())
            .when_action(AuthAction::Login(LoginForm::new("", "")))
            .then_state(|state| {
                assert!(!state.is_loading);
                assert!(
                    matches!(&state.error, Some(AuthError::InvalidForm(v)) if v.len() == 2),
                    "expected both fields reported, got {:?}",
                    state.error
                );
            })
            .then_effects(assertions::assert_no_effects)
            .run();

        assert!(authenticator.requests().is_empty());
    }

    #[test]
    fn test_login_starts_request() {
        ReducerTest::new(Auth::new())
            .with_env(env(InMemoryCredentialStore::new()))
            .given_state(AuthState::new())
            .when_action(AuthAction::Login(LoginForm::new("emilys", "emilyspass")))
            .then_state(|state| {
                assert!(state.is_loading);
                assert!(state.error.is_none());
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn test_login_ignored_while_loading() {
        let state = AuthState {
            is_loading: true,
            ..AuthState::new()
        };

        ReducerTest::new(Auth::new())
            .with_env(env(InMemoryCredentialStore::new()))
            .given_state(state)
            .when_action(AuthAction::Login(LoginForm::new("emilys", "emilyspass")))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_login_outcomes_update_state() {
        ReducerTest::new(Auth::new())
            .with_env(env(InMemoryCredentialStore::new()))
            .given_state(AuthState::new())
            .when_actions([
                AuthAction::LoginFailed(AuthError::Rejected("Invalid credentials".to_string())),
                AuthAction::LoginSucceeded(session()),
            ])
            .then_state(|state| {
                assert!(state.is_signed_in());
                assert!(state.error.is_none());
                assert_eq!(state.user().map(|u| u.id), Some(1));
            })
            .run();
    }

    #[test]
    fn test_logout_clears_session_immediately() {
        let state = AuthState {
            session: Some(session()),
            ..AuthState::new()
        };

        ReducerTest::new(Auth::new())
            .with_env(env(InMemoryCredentialStore::new()))
            .given_state(state)
            .when_action(AuthAction::Logout)
            .then_state(|state| {
                assert!(!state.is_signed_in());
                assert!(state.is_loading);
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[tokio::test]
    async fn test_restore_reads_stored_token() {
        let credentials = InMemoryCredentialStore::with_token(token_for(None));
        let session = restore(&credentials, &test_clock()).await.unwrap();
        assert_eq!(session.user.username, "emilys");
        assert_eq!(session.refresh_token, None);
        assert_eq!(session.signed_in_at, DateTime::from_timestamp(1_735_689_600, 0).unwrap());
    }

    #[tokio::test]
    async fn test_restore_signs_out_on_unusable_token() {
        let clock = test_clock();
        let expired = token_for(Some(clock.now().timestamp() - 60));

        assert!(restore(&InMemoryCredentialStore::new(), &clock).await.is_none());
        assert!(restore(&InMemoryCredentialStore::with_token("garbage"), &clock).await.is_none());
        assert!(restore(&InMemoryCredentialStore::with_token(expired), &clock).await.is_none());
        assert!(restore(&InMemoryCredentialStore::failing(), &clock).await.is_none());
    }
}
