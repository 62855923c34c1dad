//! transport::mock
//!
//! Mock transport for deterministic testing.
//!
//! # Design
//!
//! The mock transport queues canned responses and records every
//! request, so client tests can assert on the exact path, query, and
//! body that went out without any network involvement.
//!
//! # Example
//!
//! ```
//! use branchlink::transport::{MockTransport, Transport};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let transport = MockTransport::new()
//!     .respond_with(json!({ "url": "https://bnc.lt/abc" }));
//!
//! let response = transport.post("/v1/url", &json!({})).await.unwrap();
//! assert_eq!(response["url"], "https://bnc.lt/abc");
//!
//! let requests = transport.requests();
//! assert_eq!(requests[0].path, "/v1/url");
//! # });
//! ```

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::{Query, Transport, TransportError};

/// One recorded request, for test verification.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    /// HTTP method name ("GET", "POST", "PUT").
    pub method: &'static str,
    /// Request path, e.g. `/v1/url`.
    pub path: String,
    /// Query parameters in request order.
    pub query: Query,
    /// JSON body, when the method carries one.
    pub body: Option<Value>,
}

/// Internal mutable state.
#[derive(Debug, Default)]
struct MockTransportInner {
    /// Canned outcomes, consumed front to back.
    responses: VecDeque<Result<Value, TransportError>>,
    /// Recorded requests in arrival order.
    requests: Vec<RecordedRequest>,
}

/// Mock transport for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share
/// state.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

impl MockTransport {
    /// Create a mock with no queued responses. A request arriving with
    /// an empty queue gets `Value::Null`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful JSON response.
    pub fn respond_with(self, response: Value) -> Self {
        self.push(Ok(response));
        self
    }

    /// Queue a failure.
    pub fn fail_with(self, error: TransportError) -> Self {
        self.push(Err(error));
        self
    }

    /// All recorded requests, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        let inner = self.inner.lock().unwrap();
        inner.requests.clone()
    }

    /// Clear recorded requests.
    pub fn clear_requests(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.requests.clear();
    }

    fn push(&self, outcome: Result<Value, TransportError>) {
        let mut inner = self.inner.lock().unwrap();
        inner.responses.push_back(outcome);
    }

    fn take(&self, request: RecordedRequest) -> Result<Value, TransportError> {
        let mut inner = self.inner.lock().unwrap();
        inner.requests.push(request);
        inner.responses.pop_front().unwrap_or(Ok(Value::Null))
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn get(&self, path: &str, query: &Query) -> Result<Value, TransportError> {
        self.take(RecordedRequest {
            method: "GET",
            path: path.to_string(),
            query: query.clone(),
            body: None,
        })
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, TransportError> {
        self.take(RecordedRequest {
            method: "POST",
            path: path.to_string(),
            query: Vec::new(),
            body: Some(body.clone()),
        })
    }

    async fn put(&self, path: &str, body: &Value, query: &Query) -> Result<Value, TransportError> {
        self.take(RecordedRequest {
            method: "PUT",
            path: path.to_string(),
            query: query.clone(),
            body: Some(body.clone()),
        })
    }
}
