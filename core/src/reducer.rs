//! The reducer trait.

use crate::effect::Effect;
use smallvec::SmallVec;

/// State transition function of a feature.
///
/// `reduce` mutates the state in place and returns the effects to run. It is
/// called with the store's write lock held, so it must not block or await.
/// Anything slow belongs in an [`Effect::Future`].
///
/// Most reducers return zero or one effect; the inline capacity of four keeps
/// those results off the heap.
pub trait Reducer {
    /// State owned by the feature
    type State;

    /// User intents and effect results
    type Action;

    /// Injected dependencies
    type Environment;

    /// Apply `action` to `state`.
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]>;
}
