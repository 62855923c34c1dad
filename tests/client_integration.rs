//! Integration tests running the real HTTP transport against a local
//! mock server.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use branchlink::link::{Link, LINK_TYPE};
use branchlink::transport::{HttpTransport, TransportError};
use branchlink::{BranchClient, ClientError};

async fn client_against(server: &MockServer) -> BranchClient {
    let transport = HttpTransport::with_base_url(server.uri());
    BranchClient::with_transport("key_test_abc", "secret_test_xyz", Arc::new(transport))
}

#[tokio::test]
async fn create_link_posts_payload_and_reads_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/url"))
        .and(body_partial_json(json!({
            "branch_key": "key_test_abc",
            "channel": "email",
            "data": { "$marketing_title": "Spring campaign" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "url": "https://bnc.lt/l/abc"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_against(&server).await;
    let link = Link::new().channel("email").marketing_title("Spring campaign");

    let url = client.create_link(&link).await.unwrap();
    assert_eq!(url, "https://bnc.lt/l/abc");
}

#[tokio::test]
async fn get_link_decodes_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/url"))
        .and(query_param("url", "https://bnc.lt/l/abc"))
        .and(query_param("branch_key", "key_test_abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "~id": "70044080779497101",
            "channel": "email",
            "type": 1,
            "data": {
                "$one_time_use": true,
                "$custom_meta_tags": "{\"robots\":\"noindex\"}",
                "campaign_id": "xyz"
            }
        })))
        .mount(&server)
        .await;

    let client = client_against(&server).await;
    let link = client.get_link("https://bnc.lt/l/abc").await.unwrap();

    assert_eq!(link.get("channel").unwrap().as_str(), Some("email"));
    assert_eq!(link.get("one_time_use").unwrap().as_bool(), Some(true));
    assert_eq!(link.get("campaign_id").unwrap().as_str(), Some("xyz"));
    assert!(std::ptr::eq(
        link.get("type").unwrap().as_enum().unwrap(),
        LINK_TYPE.by_name("ONE_TIME_USE").unwrap()
    ));
}

#[tokio::test]
async fn update_link_puts_with_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v1/url"))
        .and(query_param("url", "https://bnc.lt/l/abc"))
        .and(body_partial_json(json!({
            "key": "key_test_abc",
            "secret": "secret_test_xyz",
            "channel": "sms"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "channel": "sms"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_against(&server).await;
    // Alias and type are stripped before the request goes out.
    let link = Link::new().channel("sms").alias("spring");

    let updated = client.update_link("https://bnc.lt/l/abc", &link).await.unwrap();
    assert_eq!(updated.get("channel").unwrap().as_str(), Some("sms"));
}

#[tokio::test]
async fn get_app_config_reads_domains() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/app/key_test_abc"))
        .and(query_param("branch_secret", "secret_test_xyz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "app_name": "demo",
            "android_app": 1,
            "universal_linking_enabled": "1",
            "default_short_url_domain": "abc.app.link",
            "creation_date": "2020-01-01T00:00:00Z"
        })))
        .mount(&server)
        .await;

    let client = client_against(&server).await;
    let config = client.get_app_config().await.unwrap();

    assert_eq!(config.app_name_value().as_deref(), Some("demo"));
    assert_eq!(config.default_short_url_domain().as_deref(), Some("abc.app.link"));
    assert_eq!(
        config.get("universal_linking_enabled").unwrap().as_bool(),
        Some(true)
    );
}

#[tokio::test]
async fn bulk_create_reports_per_element_outcomes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/url/bulk/key_test_abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "url": "https://bnc.lt/l/one" },
            { "error": "alias already taken" }
        ])))
        .mount(&server)
        .await;

    let client = client_against(&server).await;
    let outcomes = client
        .create_links(&[Link::new().channel("a"), Link::new().channel("b")])
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 2);
    assert!(matches!(
        &outcomes[0],
        branchlink::client::BulkLinkResult::Created { url } if url == "https://bnc.lt/l/one"
    ));
    assert!(matches!(
        &outcomes[1],
        branchlink::client::BulkLinkResult::Failed { error } if error == "alias already taken"
    ));
}

#[tokio::test]
async fn non_success_status_surfaces_as_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/url"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    let client = client_against(&server).await;
    let result = client.create_link(&Link::new()).await;

    match result {
        Err(ClientError::Transport(TransportError::Status { status, message })) => {
            assert_eq!(status, 401);
            assert_eq!(message, "unauthorized");
        }
        other => panic!("expected a status error, got {other:?}"),
    }
}

#[tokio::test]
async fn non_json_body_surfaces_as_bad_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/url"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = client_against(&server).await;
    let result = client.create_link(&Link::new()).await;

    assert!(matches!(
        result,
        Err(ClientError::Transport(TransportError::BadResponse(_)))
    ));
}
