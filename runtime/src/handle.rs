//! Effect completion tracking.

use crate::StoreError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Number of running effects in one scope, observable through a watch channel.
///
/// Each store has one scope covering all its effects, and every `send` opens
/// another covering that action's effects.
#[derive(Clone, Debug)]
pub(crate) struct InFlight(Arc<watch::Sender<usize>>);

impl InFlight {
    pub(crate) fn new() -> Self {
        Self(Arc::new(watch::Sender::new(0)))
    }

    /// Count one more effect until the returned guard drops.
    pub(crate) fn enter(&self) -> InFlightGuard {
        self.0.send_modify(|running| *running += 1);
        InFlightGuard(self.clone())
    }

    pub(crate) fn count(&self) -> usize {
        *self.0.borrow()
    }

    pub(crate) fn watch(&self) -> watch::Receiver<usize> {
        self.0.subscribe()
    }
}

/// Leaves the scope on drop, including when the effect task panics.
pub(crate) struct InFlightGuard(InFlight);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let Self(InFlight(running)) = self;
        running.send_modify(|count| *count = count.saturating_sub(1));
    }
}

/// Resolves when every effect started by one action has finished.
///
/// Returned by [`Store::send`](crate::Store::send). Actions produced by those
/// effects are reduced before the effect counts as finished, but the effects
/// *they* start are tracked by their own handles.
#[derive(Clone)]
pub struct EffectHandle {
    running: watch::Receiver<usize>,
}

impl EffectHandle {
    pub(crate) fn new(scope: &InFlight) -> Self {
        Self {
            running: scope.watch(),
        }
    }

    /// A handle with nothing to wait for.
    #[must_use]
    pub fn completed() -> Self {
        Self::new(&InFlight::new())
    }

    /// Effects still running.
    #[must_use]
    pub fn pending(&self) -> usize {
        *self.running.borrow()
    }

    /// Wait until no effect is running.
    pub async fn wait(&mut self) {
        // A closed channel means every guard, and with it every effect, is gone.
        let _ = self.running.wait_for(|running| *running == 0).await;
    }

    /// [`wait`](Self::wait), bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if effects are still running after `timeout`.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_handle_has_nothing_pending() {
        assert_eq!(EffectHandle::completed().pending(), 0);
    }

    #[tokio::test]
    async fn test_handle_follows_guards() {
        let scope = InFlight::new();
        let mut handle = EffectHandle::new(&scope);

        let first = scope.enter();
        let second = scope.enter();
        assert_eq!(handle.pending(), 2);
        assert_eq!(scope.count(), 2);

        drop(first);
        assert!(
            handle
                .wait_with_timeout(Duration::from_millis(20))
                .await
                .is_err()
        );

        drop(second);
        assert!(handle.wait_with_timeout(Duration::from_secs(1)).await.is_ok());
    }
}
