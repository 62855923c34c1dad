//! transport::http
//!
//! Production transport speaking HTTPS to the public API.

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;

use super::{Query, Transport, TransportError};

/// Base URL of the public API.
pub const DEFAULT_BASE_URL: &str = "https://api.branch.io";

/// HTTP transport backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Transport against the public API.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Transport against a different base URL. Used for integration
    /// tests against a local server.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &Query,
        body: Option<&Value>,
    ) -> Result<Value, TransportError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method, &url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                message: text,
            });
        }

        // 204 and friends have no body to parse.
        if status == StatusCode::NO_CONTENT || text.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|_| TransportError::BadResponse(text))
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn get(&self, path: &str, query: &Query) -> Result<Value, TransportError> {
        self.execute(Method::GET, path, query, None).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, TransportError> {
        self.execute(Method::POST, path, &Vec::new(), Some(body)).await
    }

    async fn put(&self, path: &str, body: &Value, query: &Query) -> Result<Value, TransportError> {
        self.execute(Method::PUT, path, query, Some(body)).await
    }
}
