//! # Storefront Testing
//!
//! Test support for reducers and stores:
//! - [`ReducerTest`], a Given-When-Then harness, and effect [`assertions`]
//! - Deterministic [`mocks`] for environment traits
//! - [`helpers`] for driving reducers through long action sequences
//!
//! ## Example
//!
//! ```ignore
//! use storefront_testing::{ReducerTest, assertions};
//!
//! ReducerTest::new(CartReducer)
//!     .with_env(CartEnvironment::default())
//!     .given_state(CartState::default())
//!     .when_action(CartAction::Clear)
//!     .then_state(|state| assert!(state.is_empty()))
//!     .then_effects(assertions::assert_no_effects)
//!     .run();
//! ```


pub use reducer_test::{ReducerTest, assertions};

/// Mock implementations of environment traits.
pub mod mocks {
    use chrono::{DateTime, Duration, Utc};
    use std::sync::{Arc, Mutex};
    use storefront_core::environment::Clock;

    /// Clock that only moves when told to
    ///
    /// Clones share the same time.
    ///
    /// # Example
    ///
    /// ```
    /// use storefront_testing::mocks::FixedClock;
    /// use storefront_core::environment::Clock;
    ///
    /// let clock = storefront_testing::test_clock();
    /// let before = clock.now();
    /// clock.advance(chrono::Duration::minutes(5));
    /// assert_eq!(clock.now() - before, chrono::Duration::minutes(5));
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: Arc<Mutex<DateTime<Utc>>>,
    }

    impl FixedClock {
        /// Create a clock frozen at `time`
        #[must_use]
        pub fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Arc::new(Mutex::new(time)),
            }
        }

        /// Move the clock forward
        #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
        pub fn advance(&self, by: Duration) {
            let mut time = self.time.lock().unwrap();
            *time += by;
        }
    }

    impl Clock for FixedClock {
        #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
        fn now(&self) -> DateTime<Utc> {
            *self.time.lock().unwrap()
        }
    }

    /// Clock frozen at 2025-01-01 00:00:00 UTC
    ///
    /// # Panics
    ///
    /// Never in practice; the timestamp is a valid constant.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Helpers for driving reducers outside a store.
pub mod helpers {
    use storefront_core::reducer::Reducer;

    /// Reduce `actions` in order and return the number of effects produced
    ///
    /// Effects are discarded, not executed.
    pub fn reduce_all<R, I>(reducer: &R, state: &mut R::State, actions: I, env: &R::Environment) -> usize
    where
        R: Reducer,
        I: IntoIterator<Item = R::Action>,
    {
        actions
            .into_iter()
            .map(|action| reducer.reduce(state, action, env).len())
            .sum()
    }
}

pub use mocks::{FixedClock, test_clock};

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::environment::Clock;

    #[test]
    fn test_fixed_clock_is_stable() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn test_clones_share_time() {
        let clock = test_clock();
        let other = clock.clone();
        clock.advance(chrono::Duration::seconds(30));
        assert_eq!(other.now(), clock.now());
        assert_eq!(
            other.now().to_rfc3339(),
            "2025-01-01T00:00:30+00:00"
        );
    }
}
