//! Store errors.

use thiserror::Error;

/// Failures of [`Store`](crate::Store) operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store no longer accepts actions.
    #[error("Store is shutting down")]
    ShutdownInProgress,

    /// Effects were still running when the shutdown deadline passed.
    #[error("Shutdown timed out with {0} effects still running")]
    ShutdownTimeout(usize),

    /// The awaited action or effect completion did not arrive in time.
    #[error("Timed out waiting for action")]
    Timeout,

    /// The action broadcast closed while waiting.
    #[error("Action broadcast channel closed")]
    ChannelClosed,
}
