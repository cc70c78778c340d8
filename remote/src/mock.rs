//! Mock HTTP transport for testing.

use crate::error::TransportFailure;
use crate::transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
enum Reply {
    Respond(HttpResponse),
    Fail(TransportFailure),
}

/// Mock transport with canned replies per method and path
///
/// Records every request it receives. Unknown routes answer
/// `404 {"message": "Not found"}`.
///
/// **WARNING**: Do NOT use in production. This is for testing only!
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    routes: Arc<Mutex<HashMap<(HttpMethod, String), Reply>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
    latency: Option<Duration>,
}

impl MockTransport {
    /// Create a mock with no routes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `method path` with `response`.
    #[must_use]
    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    pub fn with_response(self, method: HttpMethod, path: &str, response: HttpResponse) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert((method, path.to_string()), Reply::Respond(response));
        self
    }

    /// Answer `GET path`.
    #[must_use]
    pub fn on_get(self, path: &str, status: u16, body: Value) -> Self {
        self.with_response(HttpMethod::Get, path, HttpResponse::new(status, body))
    }

    /// Answer `POST path`.
    #[must_use]
    pub fn on_post(self, path: &str, status: u16, body: Value) -> Self {
        self.with_response(HttpMethod::Post, path, HttpResponse::new(status, body))
    }

    /// Answer `PUT path`.
    #[must_use]
    pub fn on_put(self, path: &str, status: u16, body: Value) -> Self {
        self.with_response(HttpMethod::Put, path, HttpResponse::new(status, body))
    }

    /// Fail `method path` without a response.
    #[must_use]
    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    pub fn fail(self, method: HttpMethod, path: &str, failure: TransportFailure) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert((method, path.to_string()), Reply::Fail(failure));
        self
    }

    /// Delay every reply.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Every request received, in order.
    #[must_use]
    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests received.
    #[must_use]
    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Requests received for `path`.
    #[must_use]
    pub fn requests_to(&self, path: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.path() == path)
            .collect()
    }

    /// Most recent request.
    #[must_use]
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests().pop()
    }
}

impl HttpTransport for MockTransport {
    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
        let reply = {
            let key = (request.method, request.path().to_string());
            self.requests.lock().unwrap().push(request);
            self.routes.lock().unwrap().get(&key).cloned()
        };

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        match reply {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Fail(failure)) => Err(failure),
            None => Ok(HttpResponse::new(404, json!({"message": "Not found"}))),
        }
    }
}
