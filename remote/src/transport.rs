//! HTTP layer used by the accessors.
//!
//! The accessors talk to the network only through [`HttpTransport`], so tests
//! can swap in [`MockTransport`](crate::mock::MockTransport) and production
//! uses [`ReqwestTransport`]. Timeouts belong to the transport.

use crate::error::{CLIENT_SIDE_ERROR, RemoteError, TransportFailure};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Default timeout applied by [`ReqwestTransport::new`]
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP verbs used against the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        };
        write!(f, "{verb}")
    }
}

/// A request to send through a transport
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Absolute URL without query string
    pub url: String,
    /// Query string pairs, in order
    pub query: Vec<(String, String)>,
    /// Extra request headers
    pub headers: Vec<(String, String)>,
    /// JSON body
    pub body: Option<Value>,
}

impl HttpRequest {
    /// Create a request with no query, headers or body
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// `GET url`
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// `POST url`
    #[must_use]
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    /// `PUT url`
    #[must_use]
    pub fn put(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, url)
    }

    /// `DELETE url`
    #[must_use]
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, url)
    }

    /// Replace the query string pairs
    #[must_use]
    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    /// Add a header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set a JSON body
    #[must_use]
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Path component of the URL (`/posts/search` for `https://host/posts/search`)
    #[must_use]
    pub fn path(&self) -> &str {
        let without_scheme = self
            .url
            .split_once("://")
            .map_or(self.url.as_str(), |(_, rest)| rest);
        without_scheme
            .find('/')
            .map_or("/", |idx| &without_scheme[idx..])
    }

    /// Value of a query parameter
    #[must_use]
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// A response as seen by the accessors
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Parsed JSON body (`Null` for a non-JSON error body)
    pub body: Value,
}

impl HttpResponse {
    /// A response with the given status and body
    #[must_use]
    pub const fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// `200 OK` with a JSON body
    #[must_use]
    pub const fn ok(body: Value) -> Self {
        Self::new(200, body)
    }

    /// Whether the status is in the 2xx range
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Sends HTTP requests
///
/// # Implementation Notes
///
/// - One call is exactly one network attempt; implementations never retry.
/// - A non-2xx status is a successful `send` returning that status.
pub trait HttpTransport: Send + Sync {
    /// Send a request
    ///
    /// # Errors
    ///
    /// Returns [`TransportFailure`] if the request cannot be delivered or a
    /// success response body is not JSON.
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportFailure>> + Send;
}

/// Production transport backed by `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with [`DEFAULT_TIMEOUT`]
    ///
    /// # Errors
    ///
    /// Returns [`TransportFailure::InvalidRequest`] if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, TransportFailure> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a transport with a request timeout
    ///
    /// # Errors
    ///
    /// Returns [`TransportFailure::InvalidRequest`] if the TLS backend cannot be initialised.
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportFailure> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportFailure::InvalidRequest(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap an existing client
    #[must_use]
    pub const fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

/// Send `request` and return the JSON body of a 2xx response
///
/// This is the single place where transport outcomes become [`RemoteError`]s,
/// shared by the read and write accessors. One call is one attempt.
///
/// # Errors
///
/// - [`RemoteError::Transport`] with the status for a non-2xx response
/// - [`RemoteError::Transport`] without a status when the request never completed
pub async fn send_json<H>(transport: &H, request: HttpRequest) -> crate::error::Result<Value>
where
    H: HttpTransport + ?Sized,
{
    let method = request.method;
    let url = request.url.clone();

    let response = match transport.send(request).await {
        Ok(response) => response,
        Err(failure) => {
            tracing::warn!(%method, %url, error = %failure, "Request failed before a response");
            metrics::counter!("remote.requests.total", "outcome" => "network").increment(1);
            return Err(failure.into());
        },
    };

    if !response.is_success() {
        let message = error_message(response.status, &response.body);
        tracing::warn!(%method, %url, status = response.status, %message, "Request rejected");
        metrics::counter!("remote.requests.total", "outcome" => "http_error").increment(1);
        return Err(RemoteError::Transport {
            status: Some(response.status),
            message,
        });
    }

    metrics::counter!("remote.requests.total", "outcome" => "ok").increment(1);
    Ok(response.body)
}

/// Message shown for a rejected request
///
/// The body's `message` field wins, then the canonical status text, then
/// [`CLIENT_SIDE_ERROR`].
#[must_use]
pub fn error_message(status: u16, body: &Value) -> String {
    body.get("message")
        .and_then(Value::as_str)
        .filter(|message| !message.trim().is_empty())
        .map(ToString::to_string)
        .or_else(|| {
            reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|code| code.canonical_reason())
                .map(ToString::to_string)
        })
        .unwrap_or_else(|| CLIENT_SIDE_ERROR.to_string())
}

fn classify(error: &reqwest::Error) -> TransportFailure {
    if error.is_timeout() {
        TransportFailure::Timeout(error.to_string())
    } else if error.is_builder() {
        TransportFailure::InvalidRequest(error.to_string())
    } else {
        TransportFailure::Network(error.to_string())
    }
}

impl HttpTransport for ReqwestTransport {
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportFailure>> + Send {
        let client = self.client.clone();

        async move {
            let method = match request.method {
                HttpMethod::Get => reqwest::Method::GET,
                HttpMethod::Post => reqwest::Method::POST,
                HttpMethod::Put => reqwest::Method::PUT,
                HttpMethod::Patch => reqwest::Method::PATCH,
                HttpMethod::Delete => reqwest::Method::DELETE,
            };

            let mut builder = client.request(method, &request.url);
            if !request.query.is_empty() {
                builder = builder.query(&request.query);
            }
            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }

            let response = builder.send().await.map_err(|e| classify(&e))?;
            let status = response.status().as_u16();
            let bytes = response.bytes().await.map_err(|e| classify(&e))?;

            let body = if bytes.is_empty() {
                Value::Null
            } else {
                match serde_json::from_slice::<Value>(&bytes) {
                    Ok(body) => body,
                    Err(e) if (200..300).contains(&status) => {
                        return Err(TransportFailure::InvalidBody(e.to_string()));
                    },
                    Err(_) => Value::Null,
                }
            };

            tracing::trace!(status, url = %request.url, "HTTP response received");
            Ok(HttpResponse { status, body })
        }
    }
}
