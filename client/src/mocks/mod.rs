//! Mock provider implementations for testing.
//!
//! In-memory implementations of every provider trait, for unit and
//! integration tests of the feed and auth reducers.

mod authenticator;
mod credentials;
mod posts;

pub use authenticator::MockAuthenticator;
pub use credentials::InMemoryCredentialStore;
pub use posts::MockPostFetcher;
