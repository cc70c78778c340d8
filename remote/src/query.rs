//! Read accessor.
//!
//! [`fetch_query`] performs one GET and validates the body. [`Query`] wraps
//! the same call in a stateful handle that publishes [`QueryResult`]
//! snapshots through a `watch` channel.

use crate::cache::QueryClient;
use crate::error::{RemoteError, Result};
use crate::schema::Schema;
use crate::transport::{HttpRequest, HttpTransport, send_json};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::time::Instant;

/// Cache identity of a read
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(String);

impl QueryKey {
    /// Create a key
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key as a string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for QueryKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// A query string value
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Text
    Str(String),
    /// Integer
    Int(i64),
    /// Floating point
    Float(f64),
    /// Boolean
    Bool(bool),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Query string parameters, ordered by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams(BTreeMap<String, ParamValue>);

impl QueryParams {
    /// No parameters
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Insert or replace a parameter
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(name.into(), value.into());
    }

    /// Look up a parameter
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    /// Whether there are no parameters
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serialize for the query string
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|(name, value)| (name.clone(), value.to_string()))
            .collect()
    }

    /// Stable textual form, used for request deduplication
    #[must_use]
    pub fn canonical(&self) -> String {
        self.to_pairs()
            .into_iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Behaviour switches for a read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    /// Whether a [`Query`] handle may issue requests
    pub enabled: bool,
    /// Accepted for compatibility; reads are never retried
    pub retry: bool,
    /// How long a successful result is served without a new request
    pub stale_for: Option<Duration>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            retry: false,
            stale_for: None,
        }
    }
}

impl QueryOptions {
    /// Default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the query
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Request retries (has no effect)
    #[must_use]
    pub const fn with_retry(mut self, retry: bool) -> Self {
        self.retry = retry;
        self
    }

    /// Serve a successful result for `duration` before requesting again
    #[must_use]
    pub const fn with_stale_for(mut self, duration: Duration) -> Self {
        self.stale_for = Some(duration);
        self
    }
}

/// Parameters and options of one read
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryConfig {
    /// Query string parameters
    pub params: QueryParams,
    /// Behaviour switches
    pub options: QueryOptions,
}

impl QueryConfig {
    /// Default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the parameters
    #[must_use]
    pub fn with_params(mut self, params: QueryParams) -> Self {
        self.params = params;
        self
    }

    /// Set the options
    #[must_use]
    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }
}

pub(crate) fn build_request(url: &str, config: &QueryConfig) -> HttpRequest {
    if config.options.retry {
        tracing::warn!(url, "Retry requested for a read; reads are never retried");
    }
    HttpRequest::get(url).with_query(config.params.to_pairs())
}

pub(crate) fn decode<T, S>(key: &QueryKey, schema: &S, raw: &Value) -> Result<T>
where
    S: Schema<T> + ?Sized,
{
    schema.validate(raw).map_err(|violations| {
        let error = RemoteError::validation(violations);
        tracing::warn!(key = %key, error = %error, "Response failed validation");
        metrics::counter!("remote.validation.failures").increment(1);
        error
    })
}

/// Fetch `url` once and validate the body against `schema`
///
/// `options.enabled` only gates [`Query`] handles; calling this always issues
/// the request.
///
/// # Errors
///
/// - [`RemoteError::Transport`] for a non-2xx status or network failure
/// - [`RemoteError::Validation`] when the body does not match `schema`
#[tracing::instrument(skip(transport, key, schema, config), fields(key = %key))]
pub async fn fetch_query<T, S, H>(
    transport: &H,
    key: &QueryKey,
    url: &str,
    schema: &S,
    config: &QueryConfig,
) -> Result<T>
where
    S: Schema<T> + ?Sized,
    H: HttpTransport + ?Sized,
{
    let raw = send_json(transport, build_request(url, config)).await?;
    decode(key, schema, &raw)
}

/// Snapshot of a read in progress
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult<T> {
    /// Latest successfully validated value
    pub data: Option<T>,
    /// True until the first resolution
    pub is_loading: bool,
    /// True while any request is in flight
    pub is_fetching: bool,
    /// Error of the latest resolution
    pub error: Option<RemoteError>,
}

impl<T> QueryResult<T> {
    /// Nothing requested yet
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            data: None,
            is_loading: true,
            is_fetching: false,
            error: None,
        }
    }

    /// Whether the latest resolution succeeded
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.data.is_some() && self.error.is_none()
    }

    /// Whether the latest resolution failed
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

impl<T> Default for QueryResult<T> {
    fn default() -> Self {
        Self::idle()
    }
}

/// Stateful read handle
///
/// Clones share the same result channel.
pub struct Query<T, S, H> {
    client: QueryClient<H>,
    key: QueryKey,
    url: String,
    schema: Arc<S>,
    config: QueryConfig,
    state: Arc<watch::Sender<QueryResult<T>>>,
    in_flight: Arc<AtomicUsize>,
    issued: Arc<AtomicU64>,
    applied: Arc<AtomicU64>,
    fetched_at: Arc<Mutex<Option<Instant>>>,
}

impl<T, S, H> Clone for Query<T, S, H> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            key: self.key.clone(),
            url: self.url.clone(),
            schema: Arc::clone(&self.schema),
            config: self.config.clone(),
            state: Arc::clone(&self.state),
            in_flight: Arc::clone(&self.in_flight),
            issued: Arc::clone(&self.issued),
            applied: Arc::clone(&self.applied),
            fetched_at: Arc::clone(&self.fetched_at),
        }
    }
}

impl<T, S, H> Query<T, S, H>
where
    T: Clone + Send + Sync + 'static,
    S: Schema<T> + 'static,
    H: HttpTransport + 'static,
{
    /// Create an idle query
    #[must_use]
    pub fn new(
        client: QueryClient<H>,
        key: QueryKey,
        url: impl Into<String>,
        schema: S,
        config: QueryConfig,
    ) -> Self {
        let (state, _) = watch::channel(QueryResult::idle());
        Self {
            client,
            key,
            url: url.into(),
            schema: Arc::new(schema),
            config,
            state: Arc::new(state),
            in_flight: Arc::new(AtomicUsize::new(0)),
            issued: Arc::new(AtomicU64::new(0)),
            applied: Arc::new(AtomicU64::new(0)),
            fetched_at: Arc::new(Mutex::new(None)),
        }
    }

    /// The cache key
    #[must_use]
    pub const fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Current snapshot
    #[must_use]
    pub fn result(&self) -> QueryResult<T> {
        self.state.borrow().clone()
    }

    /// Receive every state change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<QueryResult<T>> {
        self.state.subscribe()
    }

    /// Request unless a fresh success is cached or the query is disabled
    pub async fn fetch(&self) -> QueryResult<T> {
        if !self.config.options.enabled {
            tracing::debug!(key = %self.key, "Query disabled; not fetching");
            return self.result();
        }

        if let Some(stale_for) = self.config.options.stale_for {
            let fetched_at = *self.fetched_at.lock().await;
            let fresh = fetched_at.is_some_and(|at| at.elapsed() < stale_for);
            if fresh && self.state.borrow().is_success() {
                tracing::trace!(key = %self.key, "Serving fresh result");
                return self.result();
            }
        }

        self.refetch().await
    }

    /// Always request, keeping previous data on failure
    ///
    /// When refetches overlap, an outcome older than one already applied is
    /// discarded.
    pub async fn refetch(&self) -> QueryResult<T> {
        if !self.config.options.enabled {
            return self.result();
        }

        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.state.send_modify(|result| result.is_fetching = true);

        let outcome = self
            .client
            .fetch(&self.key, &self.url, self.schema.as_ref(), &self.config)
            .await;

        let still_fetching = self.in_flight.fetch_sub(1, Ordering::SeqCst) > 1;
        if self.applied.fetch_max(seq, Ordering::SeqCst) > seq {
            tracing::trace!(key = %self.key, seq, "Outdated refetch discarded");
            self.state.send_modify(|result| result.is_fetching = still_fetching);
            return self.result();
        }
        if outcome.is_ok() {
            *self.fetched_at.lock().await = Some(Instant::now());
        }

        self.state.send_modify(|result| {
            result.is_loading = false;
            result.is_fetching = still_fetching;
            match outcome {
                Ok(data) => {
                    result.data = Some(data);
                    result.error = None;
                },
                Err(error) => result.error = Some(error),
            }
        });

        self.result()
    }
}
