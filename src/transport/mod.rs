//! transport
//!
//! Transport trait for talking to the remote API.
//!
//! # Design
//!
//! The `Transport` trait is async because every operation is network
//! I/O. It is deliberately thin glue: it moves JSON payloads to and
//! from a path and reports failures, and carries no endpoint knowledge,
//! no credentials, and no retry policy. Those live in the client.
//!
//! [`http::HttpTransport`] is the production implementation;
//! [`mock::MockTransport`] provides canned responses and request
//! recording for deterministic tests.

pub mod http;
pub mod mock;

pub use http::HttpTransport;
pub use mock::MockTransport;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors from transport operations.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The server answered outside the 2xx range.
    #[error("API error: {status} - {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body text
        message: String,
    },

    /// The response body was not valid JSON.
    #[error("unreadable response: {0}")]
    BadResponse(String),

    /// Network or connection error.
    #[error("network error: {0}")]
    Network(String),
}

/// Query parameters for a request.
pub type Query = Vec<(String, String)>;

/// The transport over which API calls travel.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async
/// tasks.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Get the transport name (e.g., "http", "mock").
    fn name(&self) -> &'static str;

    /// `GET` a path with query parameters, returning the response JSON.
    async fn get(&self, path: &str, query: &Query) -> Result<Value, TransportError>;

    /// `POST` a JSON body to a path, returning the response JSON.
    async fn post(&self, path: &str, body: &Value) -> Result<Value, TransportError>;

    /// `PUT` a JSON body to a path with query parameters, returning the
    /// response JSON.
    async fn put(&self, path: &str, body: &Value, query: &Query) -> Result<Value, TransportError>;
}
