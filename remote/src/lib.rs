//! # Storefront Remote
//!
//! Remote-data accessors: every network read and write returns a value that
//! has been validated against a declared schema, or a [`RemoteError`].
//!
//! ## Core Concepts
//!
//! - **Schema**: [`Schema`] turns untrusted JSON into a typed value; [`Shape`]
//!   combinators plus [`JsonSchema`] are the stock implementation
//! - **Transport**: [`HttpTransport`] is the only way out to the network;
//!   [`ReqwestTransport`] in production, [`MockTransport`] in tests
//! - **Read accessor**: [`fetch_query`], [`QueryClient`] (joins identical
//!   in-flight reads) and the stateful [`Query`] handle
//! - **Write accessor**: [`Mutation`], with a pending flag and hooks
//!
//! Reads and writes are never retried. A failure surfaces after exactly one
//! attempt.
//!
//! ## Example
//!
//! ```ignore
//! use storefront_remote::{JsonSchema, QueryConfig, QueryKey, ReqwestTransport, Shape, fetch_query};
//!
//! let transport = ReqwestTransport::new()?;
//! let schema: JsonSchema<serde_json::Value> = JsonSchema::new(Shape::object().field("total", Shape::number()));
//! let page = fetch_query(&transport, &QueryKey::new("posts"), "https://dummyjson.com/posts", &schema, &QueryConfig::new()).await?;
//! ```

pub mod cache;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod mutation;
pub mod query;
pub mod schema;
pub mod shape;
pub mod transport;

pub use cache::QueryClient;
pub use error::{CLIENT_SIDE_ERROR, RemoteError, Result, TransportFailure};
#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockTransport;
pub use mutation::Mutation;
pub use query::{
    ParamValue, Query, QueryConfig, QueryKey, QueryOptions, QueryParams, QueryResult, fetch_query,
};
pub use schema::{AnyDocument, FieldPath, JsonSchema, PathSegment, Schema, Violation, Violations};
pub use shape::{ArrayShape, BooleanShape, NumberShape, ObjectShape, Shape, StringShape};
pub use transport::{
    DEFAULT_TIMEOUT, HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport,
    error_message, send_json,
};
