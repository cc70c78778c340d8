//! # Storefront Core
//!
//! Reducer, effect and environment types shared by every Storefront feature.
//!
//! A feature owns one state value. Its [`Reducer`](reducer::Reducer) applies
//! each action to that state synchronously and answers with
//! [`Effect`](effect::Effect) values describing the I/O to run next. The
//! runtime crate executes those effects and feeds the actions they produce
//! back into the reducer.
//!
//! Dependencies a reducer needs (HTTP, secure storage, time) reach it through
//! its `Environment`, so tests swap them for deterministic mocks.
//!
//! ## Example
//!
//! ```
//! use storefront_core::{effect::Effect, reducer::Reducer, SmallVec};
//!
//! #[derive(Clone, Debug, Default)]
//! struct BadgeState {
//!     unread: u32,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum BadgeAction {
//!     Notify,
//!     MarkRead,
//! }
//!
//! struct BadgeReducer;
//!
//! impl Reducer for BadgeReducer {
//!     type State = BadgeState;
//!     type Action = BadgeAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut BadgeState,
//!         action: BadgeAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<BadgeAction>; 4]> {
//!         match action {
//!             BadgeAction::Notify => state.unread += 1,
//!             BadgeAction::MarkRead => state.unread = 0,
//!         }
//!         SmallVec::new()
//!     }
//! }
//!
//! let mut state = BadgeState::default();
//! let effects = BadgeReducer.reduce(&mut state, BadgeAction::Notify, &());
//! assert_eq!(state.unread, 1);
//! assert!(effects.is_empty());
//! ```

pub mod effect;
pub mod environment;
pub mod reducer;

pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{SmallVec, smallvec};
