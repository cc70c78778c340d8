//! # Storefront Runtime
//!
//! [`Store`] owns a feature's state, runs its reducer and executes the
//! effects the reducer returns.
//!
//! - Actions are reduced one at a time under a write lock, in the order
//!   they are sent.
//! - Effects run on spawned tokio tasks. The actions they produce are
//!   broadcast to observers and then reduced like any other action.
//! - [`EffectHandle`] lets a caller wait for the effects of one action, and
//!   [`Store::shutdown`] waits for all of them.
//!
//! ## Example
//!
//! ```ignore
//! use storefront_runtime::Store;
//!
//! let store = Store::new(CartState::default(), CartReducer::new(), CartEnvironment);
//! store.send(CartAction::Clear).await?;
//! let count = store.state(|s| s.total_items()).await;
//! ```

pub mod error;
mod handle;
pub mod store;

pub use error::StoreError;
pub use handle::EffectHandle;
pub use store::Store;
