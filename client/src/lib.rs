//! # Storefront Client
//!
//! The storefront domain on top of the remote-data accessors:
//!
//! - [`schemas`]: DummyJSON documents and the schemas that admit them
//! - [`api`]: [`StorefrontApi`], one method per endpoint
//! - [`feed`]: infinite-scroll post feed with debounced search
//! - [`session`]: login, logout and session restore over secure storage
//! - [`forms`]: login, registration and profile form rules
//! - [`config`]: [`ClientConfig`], loadable from the environment
//!
//! Reducers take their I/O through the traits in [`providers`], so they run
//! against [`StorefrontApi`] in production and against [`mocks`] in tests.
//!
//! ## Example
//!
//! ```no_run
//! use storefront_client::{ClientConfig, FeedAction, FeedEnvironment, FeedReducer, FeedState, StorefrontApi};
//! use storefront_remote::ReqwestTransport;
//! use storefront_runtime::Store;
//! use std::time::Duration;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ClientConfig::from_env()?;
//! let api = StorefrontApi::new(ReqwestTransport::with_timeout(config.request_timeout)?, config.clone());
//!
//! let feed = Store::new(FeedState::new(), FeedReducer::new(), FeedEnvironment::from_config(api, &config));
//! feed.send_and_wait_for(
//!     FeedAction::LoadFirstPage,
//!     |a| matches!(a, FeedAction::PageLoaded { .. } | FeedAction::PageFailed { .. }),
//!     Duration::from_secs(10),
//! )
//! .await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod feed;
pub mod forms;
#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;
pub mod providers;
pub mod schemas;
pub mod session;

pub use api::StorefrontApi;
pub use config::ClientConfig;
pub use error::{AuthError, AuthResult, ConfigError};
pub use feed::{FeedAction, FeedEnvironment, FeedReducer, FeedState};
pub use forms::{LoginForm, ProfileForm, ProfileUpdate, RegisterForm, RegisterPayload};
pub use providers::{AUTH_TOKEN_KEY, Authenticator, CredentialStore, PageRequest, PostFetcher};
pub use session::{
    AuthAction, AuthEnvironment, AuthReducer, AuthState, Session, SessionUser, TokenClaims,
    decode_token,
};
