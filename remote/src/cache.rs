//! Request deduplication for reads.

use crate::error::Result;
use crate::query::{QueryConfig, QueryKey, build_request, decode};
use crate::schema::Schema;
use crate::transport::{HttpTransport, send_json};
use futures::future::{BoxFuture, FutureExt, Shared};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

type SharedFetch = Shared<BoxFuture<'static, Result<Value>>>;
type InFlight = Arc<Mutex<HashMap<String, SharedFetch>>>;

/// Caching collaborator for reads
///
/// Concurrent reads with the same key, params and URL share one request.
/// Each caller validates the shared document against its own schema. An
/// entry lives only while its request is in flight.
pub struct QueryClient<H> {
    transport: Arc<H>,
    in_flight: InFlight,
}

impl<H> Clone for QueryClient<H> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<H: HttpTransport + 'static> QueryClient<H> {
    /// Create a client over a transport
    #[must_use]
    pub fn new(transport: H) -> Self {
        Self::from_arc(Arc::new(transport))
    }

    /// Create a client over a shared transport
    #[must_use]
    pub fn from_arc(transport: Arc<H>) -> Self {
        Self {
            transport,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The underlying transport
    #[must_use]
    pub fn transport(&self) -> &H {
        &self.transport
    }

    /// Number of distinct requests currently in flight
    pub async fn in_flight(&self) -> usize {
        self.in_flight.lock().await.len()
    }

    /// Read `url` and validate it, joining an identical in-flight request
    ///
    /// # Errors
    ///
    /// Same as [`fetch_query`](crate::query::fetch_query).
    #[tracing::instrument(skip(self, key, schema, config), fields(key = %key))]
    pub async fn fetch<T, S>(
        &self,
        key: &QueryKey,
        url: &str,
        schema: &S,
        config: &QueryConfig,
    ) -> Result<T>
    where
        S: Schema<T> + ?Sized,
    {
        let raw = self.fetch_raw(key, url, config).await?;
        decode(key, schema, &raw)
    }

    async fn fetch_raw(&self, key: &QueryKey, url: &str, config: &QueryConfig) -> Result<Value> {
        let cache_key = format!("{key}|{url}?{}", config.params.canonical());

        let shared = {
            let mut in_flight = self.in_flight.lock().await;
            if let Some(existing) = in_flight.get(&cache_key) {
                tracing::debug!(key = %key, "Joining in-flight request");
                metrics::counter!("remote.requests.deduplicated").increment(1);
                existing.clone()
            } else {
                let transport = Arc::clone(&self.transport);
                let entries = Arc::clone(&self.in_flight);
                let request = build_request(url, config);
                let entry = cache_key.clone();

                let fetch = async move {
                    let outcome = send_json(transport.as_ref(), request).await;
                    entries.lock().await.remove(&entry);
                    outcome
                }
                .boxed()
                .shared();

                in_flight.insert(cache_key, fetch.clone());
                fetch
            }
        };

        shared.await
    }
}
