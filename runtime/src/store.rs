//! The store runtime.

use crate::StoreError;
use crate::handle::{EffectHandle, InFlight};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use storefront_core::{effect::Effect, reducer::Reducer};
use tokio::sync::{RwLock, broadcast, watch};

/// Actions buffered for slow observers before they start lagging.
const DEFAULT_BROADCAST_CAPACITY: usize = 16;

/// Everything clones of one store share.
struct Shared<S, A> {
    state: RwLock<S>,
    closing: AtomicBool,
    /// Effects of every action, for shutdown.
    effects: InFlight,
    /// Actions produced by effects, sent before they are reduced.
    actions: broadcast::Sender<A>,
    /// Bumped after every reduction.
    revision: watch::Sender<u64>,
}

/// Owns a feature's state and runs its reducer.
///
/// Cloning yields another handle to the same state, broadcast and effects.
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    shared: Arc<Shared<S, A>>,
    reducer: R,
    environment: E,
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
    A: Send + Clone + 'static,
    S: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Create a store with a 16-action broadcast buffer.
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self::with_broadcast_capacity(initial_state, reducer, environment, DEFAULT_BROADCAST_CAPACITY)
    }

    /// Create a store whose action broadcast buffers `capacity` actions.
    #[must_use]
    pub fn with_broadcast_capacity(initial_state: S, reducer: R, environment: E, capacity: usize) -> Self {
        let (actions, _) = broadcast::channel(capacity.max(1));
        Self {
            shared: Arc::new(Shared {
                state: RwLock::new(initial_state),
                closing: AtomicBool::new(false),
                effects: InFlight::new(),
                actions,
                revision: watch::Sender::new(0),
            }),
            reducer,
            environment,
        }
    }

    /// Reduce `action` and start the effects it returns.
    ///
    /// Returns as soon as the effects are started. Concurrent calls are
    /// reduced one at a time, each atomically.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] once [`shutdown`](Self::shutdown) began.
    #[tracing::instrument(skip_all, name = "store_send")]
    pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError>
    where
        R: Clone,
        E: Clone,
    {
        if self.shared.closing.load(Ordering::Acquire) {
            tracing::warn!("Action rejected: store is shutting down");
            return Err(StoreError::ShutdownInProgress);
        }
        metrics::counter!("store.commands.total").increment(1);

        let effects = {
            let mut state = self.shared.state.write().await;
            self.reducer.reduce(&mut *state, action, &self.environment)
        };
        self.shared.revision.send_modify(|revision| *revision += 1);
        tracing::trace!(effects = effects.len(), "Action reduced");

        let scope = InFlight::new();
        let handle = EffectHandle::new(&scope);
        for effect in effects {
            self.spawn(effect, &scope);
        }
        Ok(handle)
    }

    /// Send `action`, then wait for the first effect-produced action matching
    /// `predicate`.
    ///
    /// The broadcast is subscribed before sending, so an effect that finishes
    /// immediately is still observed. The matching action is returned when
    /// it is broadcast, which is just before it is reduced.
    ///
    /// # Errors
    ///
    /// - [`StoreError::ShutdownInProgress`] if the store is shutting down
    /// - [`StoreError::Timeout`] if nothing matched within `timeout`
    /// - [`StoreError::ChannelClosed`] if the broadcast closed
    pub async fn send_and_wait_for<F>(&self, action: A, predicate: F, timeout: Duration) -> Result<A, StoreError>
    where
        R: Clone,
        E: Clone,
        F: Fn(&A) -> bool,
    {
        let mut observed = self.shared.actions.subscribe();
        self.send(action).await?;

        let matching = async {
            loop {
                match observed.recv().await {
                    Ok(action) if predicate(&action) => return Ok(action),
                    Ok(_) => {},
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Observer lagged behind the action broadcast");
                    },
                    Err(broadcast::error::RecvError::Closed) => return Err(StoreError::ChannelClosed),
                }
            }
        };
        tokio::time::timeout(timeout, matching)
            .await
            .map_err(|_| StoreError::Timeout)?
    }

    /// Stop accepting actions and wait for running effects.
    ///
    /// Actions produced by effects after this point are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] with the number of effects
    /// still running if they outlast `timeout`.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        tracing::info!("Shutting down store");
        self.shared.closing.store(true, Ordering::Release);

        let mut running = self.shared.effects.watch();
        let drained = tokio::time::timeout(timeout, running.wait_for(|count| *count == 0))
            .await
            .is_ok();

        if drained {
            tracing::info!("Store shut down");
            Ok(())
        } else {
            let pending = self.shared.effects.count();
            tracing::error!(pending, "Shutdown timed out");
            Err(StoreError::ShutdownTimeout(pending))
        }
    }

    /// Observe every action produced by an effect.
    ///
    /// Actions passed to [`send`](Self::send) directly are not broadcast.
    #[must_use]
    pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
        self.shared.actions.subscribe()
    }

    /// Observe state changes.
    ///
    /// The value is a revision bumped after every reduction; read the state
    /// itself with [`state`](Self::state).
    #[must_use]
    pub fn subscribe_changes(&self) -> watch::Receiver<u64> {
        self.shared.revision.subscribe()
    }

    /// Read the state through `f`.
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        let state = self.shared.state.read().await;
        f(&*state)
    }

    /// Effects running across all actions.
    #[must_use]
    pub fn pending_effects(&self) -> usize {
        self.shared.effects.count()
    }

    fn spawn(&self, effect: Effect<A>, scope: &InFlight)
    where
        R: Clone,
        E: Clone,
    {
        match effect {
            Effect::None => tracing::trace!("Effect::None skipped"),
            Effect::Parallel(effects) => {
                tracing::trace!(count = effects.len(), "Starting parallel effects");
                for effect in effects {
                    self.spawn(effect, scope);
                }
            },
            Effect::Future(fut) => self.spawn_task("future", scope, fut),
            Effect::Delay { duration, action } => {
                tracing::trace!(?duration, "Scheduling delayed action");
                self.spawn_task("delay", scope, async move {
                    tokio::time::sleep(duration).await;
                    Some(*action)
                });
            },
            Effect::Sequential(effects) => {
                let store = self.clone();
                self.spawn_task("sequential", scope, async move {
                    for effect in effects {
                        let step = InFlight::new();
                        let mut done = EffectHandle::new(&step);
                        store.spawn(effect, &step);
                        done.wait().await;
                    }
                    None
                });
            },
        }
    }

    fn spawn_task<F>(&self, kind: &'static str, scope: &InFlight, task: F)
    where
        R: Clone,
        E: Clone,
        F: Future<Output = Option<A>> + Send + 'static,
    {
        metrics::counter!("store.effects.executed", "type" => kind).increment(1);
        let guards = (scope.enter(), self.shared.effects.enter());
        let store = self.clone();

        tokio::spawn(async move {
            let _guards = guards;
            match task.await {
                Some(action) => store.feed_back(action).await,
                None => tracing::trace!(kind, "Effect finished without an action"),
            }
        });
    }

    async fn feed_back(&self, action: A)
    where
        R: Clone,
        E: Clone,
    {
        // No receivers is not an error.
        let _ = self.shared.actions.send(action.clone());

        if let Err(error) = self.send(action).await {
            tracing::debug!(error = %error, "Dropped action produced by an effect");
        }
    }
}

impl<S, A, E, R> Clone for Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone,
    E: Clone,
{
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            reducer: self.reducer.clone(),
            environment: self.environment.clone(),
        }
    }
}
