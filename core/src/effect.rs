//! Effect descriptions.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Boxed future an effect runs; its output, if any, is the next action.
pub type EffectFuture<Action> = Pin<Box<dyn Future<Output = Option<Action>> + Send>>;

/// Work a reducer asks the runtime to do.
///
/// Effects are inert values. Nothing happens until a store executes them, which
/// is what lets reducer tests assert on effects without running them.
pub enum Effect<Action> {
    /// Nothing to do
    None,

    /// Start every effect at once
    Parallel(Vec<Effect<Action>>),

    /// Run effects one after another, each to completion
    Sequential(Vec<Effect<Action>>),

    /// Send `action` after `duration`
    ///
    /// Used for debouncing: the reducer re-checks on arrival whether the
    /// action is still current.
    Delay {
        /// Wait before sending
        duration: Duration,
        /// Action sent when the wait is over
        action: Box<Action>,
    },

    /// Await a future and send its action, if it yields one
    Future(EffectFuture<Action>),
}

impl<Action> Effect<Action> {
    /// Start `effects` concurrently.
    #[must_use]
    pub const fn merge(effects: Vec<Self>) -> Self {
        Self::Parallel(effects)
    }

    /// Run `effects` in order.
    #[must_use]
    pub const fn chain(effects: Vec<Self>) -> Self {
        Self::Sequential(effects)
    }

    /// Send `action` once `duration` has passed.
    #[must_use]
    pub fn delay(duration: Duration, action: Action) -> Self {
        Self::Delay {
            duration,
            action: Box::new(action),
        }
    }

    /// Run an async block.
    pub fn future<F>(fut: F) -> Self
    where
        F: Future<Output = Option<Action>> + Send + 'static,
    {
        Self::Future(Box::pin(fut))
    }

    /// Whether running this effect does no work at all.
    #[must_use]
    pub fn is_none(&self) -> bool {
        match self {
            Self::None => true,
            Self::Parallel(effects) | Self::Sequential(effects) => effects.iter().all(Self::is_none),
            Self::Delay { .. } | Self::Future(_) => false,
        }
    }
}

impl<Action: fmt::Debug> fmt::Debug for Effect<Action> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("Effect::None"),
            Self::Parallel(effects) => f.debug_tuple("Effect::Parallel").field(effects).finish(),
            Self::Sequential(effects) => f.debug_tuple("Effect::Sequential").field(effects).finish(),
            Self::Delay { duration, action } => f
                .debug_struct("Effect::Delay")
                .field("duration", duration)
                .field("action", action)
                .finish(),
            Self::Future(_) => f.write_str("Effect::Future(<future>)"),
        }
    }
}
