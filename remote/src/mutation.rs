//! Write accessor.

use crate::error::{RemoteError, Result};
use crate::schema::Schema;
use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;
use std::fmt::{self, Display};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::watch;

type WriteFn<V> = Arc<dyn Fn(V) -> BoxFuture<'static, std::result::Result<Value, String>> + Send + Sync>;
type SuccessHook<T> = Arc<dyn Fn(&T) + Send + Sync>;
type ErrorHook = Arc<dyn Fn(&RemoteError) + Send + Sync>;

/// A validated remote write
///
/// Wraps a caller-supplied async function. Each [`mutate`](Self::mutate)
/// invokes it exactly once and validates what it resolves to. Clones share
/// the pending flag.
pub struct Mutation<V, T> {
    name: String,
    write: WriteFn<V>,
    schema: Arc<dyn Schema<T>>,
    on_success: Vec<SuccessHook<T>>,
    on_error: Vec<ErrorHook>,
    in_flight: Arc<AtomicUsize>,
    pending: Arc<watch::Sender<bool>>,
}

impl<V, T> Clone for Mutation<V, T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            write: Arc::clone(&self.write),
            schema: Arc::clone(&self.schema),
            on_success: self.on_success.clone(),
            on_error: self.on_error.clone(),
            in_flight: Arc::clone(&self.in_flight),
            pending: Arc::clone(&self.pending),
        }
    }
}

impl<V, T> fmt::Debug for Mutation<V, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mutation")
            .field("name", &self.name)
            .field("in_flight", &self.in_flight.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Clears the pending flag when the last in-flight call finishes,
/// including when the caller drops the future.
struct PendingGuard<'a> {
    in_flight: &'a AtomicUsize,
    pending: &'a watch::Sender<bool>,
}

impl<'a> PendingGuard<'a> {
    fn enter(in_flight: &'a AtomicUsize, pending: &'a watch::Sender<bool>) -> Self {
        in_flight.fetch_add(1, Ordering::SeqCst);
        pending.send_replace(true);
        Self { in_flight, pending }
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.pending.send_replace(false);
        }
    }
}

impl<V: Send + 'static, T: 'static> Mutation<V, T> {
    /// Create a mutation from a write function and the schema of its result
    pub fn new<F, Fut, E, S>(name: impl Into<String>, schema: S, write: F) -> Self
    where
        F: Fn(V) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<Value, E>> + Send + 'static,
        E: Display + 'static,
        S: Schema<T> + 'static,
    {
        let write: WriteFn<V> = Arc::new(move |vars| {
            let call = write(vars);
            async move { call.await.map_err(|e| e.to_string()) }.boxed()
        });
        let (pending, _) = watch::channel(false);

        Self {
            name: name.into(),
            write,
            schema: Arc::new(schema),
            on_success: Vec::new(),
            on_error: Vec::new(),
            in_flight: Arc::new(AtomicUsize::new(0)),
            pending: Arc::new(pending),
        }
    }

    /// Run `hook` after every successful call
    #[must_use]
    pub fn on_success<F>(mut self, hook: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.on_success.push(Arc::new(hook));
        self
    }

    /// Run `hook` after every failed call
    #[must_use]
    pub fn on_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&RemoteError) + Send + Sync + 'static,
    {
        self.on_error.push(Arc::new(hook));
        self
    }

    /// Whether any call is in flight
    #[must_use]
    pub fn is_pending(&self) -> bool {
        *self.pending.borrow()
    }

    /// Receive pending flag changes
    #[must_use]
    pub fn subscribe_pending(&self) -> watch::Receiver<bool> {
        self.pending.subscribe()
    }

    /// Invoke the write function once and validate its result
    ///
    /// # Errors
    ///
    /// - [`RemoteError::Mutation`] when the write function fails
    /// - [`RemoteError::Validation`] when its result does not match the schema
    #[tracing::instrument(skip(self, vars), fields(mutation = %self.name))]
    pub async fn mutate(&self, vars: V) -> Result<T> {
        let outcome = {
            let _guard = PendingGuard::enter(&self.in_flight, &self.pending);
            (self.write)(vars).await
        };

        let result = match outcome {
            Ok(raw) => self.schema.validate(&raw).map_err(RemoteError::validation),
            Err(message) => Err(RemoteError::mutation(message)),
        };

        match &result {
            Ok(value) => {
                tracing::debug!("Mutation succeeded");
                for hook in &self.on_success {
                    hook(value);
                }
            },
            Err(error) => {
                tracing::warn!(error = %error, "Mutation failed");
                for hook in &self.on_error {
                    hook(error);
                }
            },
        }

        result
    }
}
