//! client
//!
//! The API client: endpoint knowledge, credential handling, and the
//! glue between the wire codec and the transport.
//!
//! # Example
//!
//! ```no_run
//! use branchlink::link::Link;
//! use branchlink::BranchClient;
//!
//! # async fn run() -> Result<(), branchlink::ClientError> {
//! let client = BranchClient::new("key_live_xxx", "secret_live_xxx");
//!
//! let link = Link::new().channel("email").feature("sharing");
//! let url = client.create_link(&link).await?;
//! println!("{url}");
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::app::AppConfig;
use crate::link::Link;
use crate::transport::{HttpTransport, Query, Transport, TransportError};
use crate::wire::WireError;

const LINK_ENDPOINT: &str = "/v1/url";
const BULK_LINK_ENDPOINT: &str = "/v1/url/bulk";
const APP_ENDPOINT: &str = "/v1/app";

/// Errors from client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The transport failed or the server answered outside 2xx.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A response payload could not be decoded into a schema object.
    #[error(transparent)]
    Wire(#[from] WireError),

    /// The server reported an application-level error in the response
    /// body.
    #[error("API error: {0}")]
    Api(String),

    /// A link-creation response carried no URL.
    #[error("response did not contain a link URL")]
    MissingUrl,

    /// The app has no short URL domain to build a dynamic link against.
    #[error("app has no short URL domain configured")]
    NoDomain,

    /// A dynamic link could not be assembled into a valid URL.
    #[error("could not assemble URL: {0}")]
    BadUrl(String),
}

/// One outcome inside a bulk link-creation response: the server answers
/// per element, so one batch can mix successes and failures.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BulkLinkResult {
    Created {
        /// The created short URL.
        url: String,
    },
    Failed {
        /// The server's error message for this element.
        error: String,
    },
}

#[derive(Debug, Deserialize)]
struct CreatedLink {
    url: String,
}

/// Client for the deep-linking API.
///
/// Cheap to clone; clones share the underlying transport.
#[derive(Clone)]
pub struct BranchClient {
    branch_key: String,
    branch_secret: String,
    transport: Arc<dyn Transport>,
}

impl BranchClient {
    /// Client against the public API over HTTPS.
    pub fn new(branch_key: impl Into<String>, branch_secret: impl Into<String>) -> Self {
        Self::with_transport(branch_key, branch_secret, Arc::new(HttpTransport::new()))
    }

    /// Client over a caller-supplied transport.
    pub fn with_transport(
        branch_key: impl Into<String>,
        branch_secret: impl Into<String>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            branch_key: branch_key.into(),
            branch_secret: branch_secret.into(),
            transport,
        }
    }

    /// Create a short link, returning its URL.
    ///
    /// # Errors
    ///
    /// [`ClientError::Transport`] on network/status failures,
    /// [`ClientError::Api`] when the response reports an error, and
    /// [`ClientError::MissingUrl`] when it carries no URL.
    pub async fn create_link(&self, link: &Link) -> Result<String, ClientError> {
        let mut body = link.build();
        self.insert_key(&mut body);

        let response = self.transport.post(LINK_ENDPOINT, &body).await?;
        Self::check_api_error(&response)?;

        let created: CreatedLink =
            serde_json::from_value(response).map_err(|_| ClientError::MissingUrl)?;
        Ok(created.url)
    }

    /// Create several short links in one request.
    ///
    /// The server answers element by element; the returned vector is in
    /// request order.
    pub async fn create_links(&self, links: &[Link]) -> Result<Vec<BulkLinkResult>, ClientError> {
        let body = Value::Array(links.iter().map(Link::build).collect());
        let path = format!("{BULK_LINK_ENDPOINT}/{}", self.branch_key);

        let response = self.transport.post(&path, &body).await?;
        serde_json::from_value(response)
            .map_err(|e| ClientError::Api(format!("unexpected bulk response shape: {e}")))
    }

    /// Fetch an existing link's configuration by its short URL.
    pub async fn get_link(&self, url: &str) -> Result<Link, ClientError> {
        let query: Query = vec![
            ("url".to_string(), url.to_string()),
            ("branch_key".to_string(), self.branch_key.clone()),
        ];

        let response = self.transport.get(LINK_ENDPOINT, &query).await?;
        Self::check_api_error(&response)?;
        Ok(Link::parse(&response)?)
    }

    /// Update an existing link in place.
    ///
    /// The alias and generation type are fixed at creation and are
    /// stripped from the outgoing payload. Update authenticates in the
    /// body as `key`/`secret`, unlike creation's `branch_key`.
    pub async fn update_link(&self, url: &str, link: &Link) -> Result<Link, ClientError> {
        let mut body = link.build();
        if let Some(object) = body.as_object_mut() {
            object.remove("alias");
            object.remove("type");
        }
        Self::insert(&mut body, "key", self.branch_key.clone());
        Self::insert(&mut body, "secret", self.branch_secret.clone());

        let query: Query = vec![("url".to_string(), url.to_string())];
        let response = self.transport.put(LINK_ENDPOINT, &body, &query).await?;
        Self::check_api_error(&response)?;
        Ok(Link::parse(&response)?)
    }

    /// Fetch the app configuration for this client's key.
    pub async fn get_app_config(&self) -> Result<AppConfig, ClientError> {
        let path = format!("{APP_ENDPOINT}/{}", self.branch_key);
        let query: Query = vec![("branch_secret".to_string(), self.branch_secret.clone())];

        let response = self.transport.get(&path, &query).await?;
        Self::check_api_error(&response)?;
        Ok(AppConfig::parse(&response)?)
    }

    /// Assemble a long dynamic link locally, without touching the API.
    ///
    /// The link's parameters are flattened into the query string with
    /// bracket nesting for the data block (`data[$og_title]=...`);
    /// empty and falsy values are stripped first. The domain comes from
    /// the app's branded short domain, falling back to the
    /// platform-assigned default.
    ///
    /// # Errors
    ///
    /// [`ClientError::NoDomain`] when the configuration carries neither
    /// domain, [`ClientError::BadUrl`] when the assembled URL does not
    /// parse.
    pub fn create_dynamic_link(
        &self,
        link: &Link,
        config: &AppConfig,
    ) -> Result<String, ClientError> {
        let domain = config
            .short_url_domain_value()
            .filter(|d| !d.is_empty())
            .or_else(|| config.default_short_url_domain().filter(|d| !d.is_empty()))
            .ok_or(ClientError::NoDomain)?;

        let params = Self::query_params(link.build_for_url());
        let base = format!("https://{domain}/");

        let url = reqwest::Url::parse_with_params(&base, &params)
            .map_err(|e| ClientError::BadUrl(e.to_string()))?;
        Ok(url.to_string())
    }

    /// Flatten a URL-mode payload into query parameters. Nested objects
    /// get bracket keys, lists get indexed keys.
    fn query_params(payload: Value) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Value::Object(object) = payload {
            for (key, value) in object {
                Self::push_param(&mut params, key, value);
            }
        }
        params
    }

    fn push_param(params: &mut Vec<(String, String)>, key: String, value: Value) {
        match value {
            Value::Object(object) => {
                for (inner_key, inner) in object {
                    Self::push_param(params, format!("{key}[{inner_key}]"), inner);
                }
            }
            Value::Array(items) => {
                for (index, item) in items.into_iter().enumerate() {
                    Self::push_param(params, format!("{key}[{index}]"), item);
                }
            }
            Value::String(s) => params.push((key, s)),
            Value::Bool(b) => params.push((key, if b { "1" } else { "0" }.to_string())),
            Value::Number(n) => params.push((key, n.to_string())),
            Value::Null => {}
        }
    }

    fn insert_key(&self, body: &mut Value) {
        Self::insert(body, "branch_key", self.branch_key.clone());
    }

    fn insert(body: &mut Value, key: &str, value: String) {
        if let Some(object) = body.as_object_mut() {
            object.insert(key.to_string(), Value::String(value));
        }
    }

    /// A 2xx response can still carry an application-level error.
    fn check_api_error(response: &Value) -> Result<(), ClientError> {
        match response.get("error") {
            None => Ok(()),
            Some(Value::String(message)) => Err(ClientError::Api(message.clone())),
            Some(other) => Err(ClientError::Api(other.to_string())),
        }
    }
}

impl std::fmt::Debug for BranchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BranchClient")
            .field("branch_key", &self.branch_key)
            .field("transport", &self.transport.name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::LINK_TYPE;
    use crate::schema::FieldValue;
    use crate::transport::MockTransport;
    use serde_json::json;

    fn client(transport: &MockTransport) -> BranchClient {
        BranchClient::with_transport("key_test_abc", "secret_test_xyz", Arc::new(transport.clone()))
    }

    mod create_link {
        use super::*;

        #[tokio::test]
        async fn posts_body_with_key_and_returns_url() {
            let transport = MockTransport::new().respond_with(json!({
                "url": "https://bnc.lt/abc"
            }));
            let client = client(&transport);

            let link = Link::new().channel("email");
            let url = client.create_link(&link).await.unwrap();
            assert_eq!(url, "https://bnc.lt/abc");

            let requests = transport.requests();
            assert_eq!(requests[0].method, "POST");
            assert_eq!(requests[0].path, "/v1/url");
            let body = requests[0].body.as_ref().unwrap();
            assert_eq!(body["branch_key"], json!("key_test_abc"));
            assert_eq!(body["channel"], json!("email"));
            assert_eq!(body["data"]["$always_deeplink"], json!(true));
        }

        #[tokio::test]
        async fn error_response_surfaces() {
            let transport = MockTransport::new().respond_with(json!({
                "error": "invalid branch_key"
            }));
            let client = client(&transport);

            let result = client.create_link(&Link::new()).await;
            assert!(matches!(result, Err(ClientError::Api(m)) if m == "invalid branch_key"));
        }

        #[tokio::test]
        async fn missing_url_surfaces() {
            let transport = MockTransport::new().respond_with(json!({}));
            let client = client(&transport);

            let result = client.create_link(&Link::new()).await;
            assert!(matches!(result, Err(ClientError::MissingUrl)));
        }

        #[tokio::test]
        async fn transport_failure_surfaces() {
            let transport = MockTransport::new().fail_with(TransportError::Status {
                status: 401,
                message: "unauthorized".into(),
            });
            let client = client(&transport);

            let result = client.create_link(&Link::new()).await;
            assert!(matches!(result, Err(ClientError::Transport(_))));
        }
    }

    mod create_links {
        use super::*;

        #[tokio::test]
        async fn bulk_endpoint_carries_key_in_path() {
            let transport = MockTransport::new().respond_with(json!([
                { "url": "https://bnc.lt/a" },
                { "error": "duplicate alias" }
            ]));
            let client = client(&transport);

            let outcomes = client
                .create_links(&[Link::new().channel("a"), Link::new().channel("b")])
                .await
                .unwrap();

            assert_eq!(transport.requests()[0].path, "/v1/url/bulk/key_test_abc");
            assert!(matches!(&outcomes[0], BulkLinkResult::Created { url } if url == "https://bnc.lt/a"));
            assert!(matches!(&outcomes[1], BulkLinkResult::Failed { error } if error == "duplicate alias"));
        }
    }

    mod get_link {
        use super::*;

        #[tokio::test]
        async fn decodes_response_into_link() {
            let transport = MockTransport::new().respond_with(json!({
                "~id": "70044080779497101",
                "channel": "email",
                "type": 2,
                "data": { "$marketing_title": "Spring campaign" }
            }));
            let client = client(&transport);

            let link = client.get_link("https://bnc.lt/abc").await.unwrap();
            assert_eq!(link.get("channel").unwrap().as_str(), Some("email"));
            assert!(std::ptr::eq(
                link.get("type").unwrap().as_enum().unwrap(),
                LINK_TYPE.by_name("MARKETING").unwrap()
            ));

            let requests = transport.requests();
            assert_eq!(requests[0].method, "GET");
            assert_eq!(
                requests[0].query,
                vec![
                    ("url".to_string(), "https://bnc.lt/abc".to_string()),
                    ("branch_key".to_string(), "key_test_abc".to_string()),
                ]
            );
        }
    }

    mod update_link {
        use super::*;

        #[tokio::test]
        async fn strips_immutable_fields_and_adds_credentials() {
            let transport = MockTransport::new().respond_with(json!({
                "channel": "email"
            }));
            let client = client(&transport);

            let link = Link::new()
                .channel("email")
                .alias("spring")
                .link_type(LINK_TYPE.by_name("MARKETING").unwrap());
            client.update_link("https://bnc.lt/abc", &link).await.unwrap();

            let requests = transport.requests();
            assert_eq!(requests[0].method, "PUT");
            let body = requests[0].body.as_ref().unwrap();
            assert!(body.get("alias").is_none());
            assert!(body.get("type").is_none());
            // Update uses the bare credential keys, not branch_key.
            assert_eq!(body["key"], json!("key_test_abc"));
            assert_eq!(body["secret"], json!("secret_test_xyz"));
            assert!(body.get("branch_key").is_none());
            assert_eq!(
                requests[0].query,
                vec![("url".to_string(), "https://bnc.lt/abc".to_string())]
            );
        }
    }

    mod get_app_config {
        use super::*;

        #[tokio::test]
        async fn fetches_and_decodes() {
            let transport = MockTransport::new().respond_with(json!({
                "app_name": "demo",
                "android_app": 1,
                "default_short_url_domain": "abc.app.link"
            }));
            let client = client(&transport);

            let config = client.get_app_config().await.unwrap();
            assert_eq!(config.app_name_value().as_deref(), Some("demo"));
            assert_eq!(
                config.default_short_url_domain().as_deref(),
                Some("abc.app.link")
            );

            let requests = transport.requests();
            assert_eq!(requests[0].path, "/v1/app/key_test_abc");
            assert_eq!(
                requests[0].query,
                vec![("branch_secret".to_string(), "secret_test_xyz".to_string())]
            );
        }
    }

    mod create_dynamic_link {
        use super::*;

        #[tokio::test]
        async fn builds_query_with_bracketed_data_keys() {
            let client = client(&MockTransport::new());
            let config = AppConfig::parse(&json!({
                "short_url_domain": "go.example.com"
            }))
            .unwrap();

            let mut link = Link::new().channel("email").add_tag("spring");
            link.set("og_title", FieldValue::from("My title")).unwrap();

            let url = client.create_dynamic_link(&link, &config).unwrap();
            assert!(url.starts_with("https://go.example.com/?"));
            assert!(url.contains("channel=email"));
            assert!(url.contains("tags%5B0%5D=spring"));
            assert!(url.contains("data%5B%24og_title%5D=My+title"));
            // Url mode strips the falsy boolean defaults.
            assert!(!url.contains("web_only"));
        }

        #[tokio::test]
        async fn falls_back_to_default_domain() {
            let client = client(&MockTransport::new());
            let config = AppConfig::parse(&json!({
                "default_short_url_domain": "abc.app.link"
            }))
            .unwrap();

            let url = client
                .create_dynamic_link(&Link::new().channel("email"), &config)
                .unwrap();
            assert!(url.starts_with("https://abc.app.link/"));
        }

        #[tokio::test]
        async fn no_domain_is_an_error() {
            let client = client(&MockTransport::new());
            let config = AppConfig::new("demo");

            let result = client.create_dynamic_link(&Link::new(), &config);
            assert!(matches!(result, Err(ClientError::NoDomain)));
        }
    }
}
