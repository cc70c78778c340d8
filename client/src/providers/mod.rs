//! Client providers.
//!
//! Traits for every collaborator the feed and auth reducers talk to. The
//! reducers depend only on these; [`StorefrontApi`](crate::api::StorefrontApi)
//! implements the network-backed ones and [`crate::mocks`] the test doubles.

mod authenticator;
mod credentials;
mod posts;

pub use authenticator::Authenticator;
pub use credentials::{AUTH_TOKEN_KEY, CredentialStore};
pub use posts::{PageRequest, PostFetcher};
