//! HTTP transport behavior against a mock provider

use crate::common::{config_for, transport_for, TOKEN};
use firedash::config::TransportConfig;
use firedash::transport::{build_http_client, Transport};
use firedash::{HttpTransport, TransportError};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_post_sends_bearer_token_and_json() {
    let mock_server = MockServer::start().await;
    let payload = json!({"url": "https://example.com", "limit": 5});

    Mock::given(method("POST"))
        .and(path("/v1/map"))
        .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
        .and(header("content-type", "application/json"))
        .and(body_json(&payload))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "links": ["https://example.com/a"]})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = transport_for(&config_for(&mock_server));
    let body = transport.post("/map", &payload).await.unwrap();

    assert_eq!(body["links"][0], "https://example.com/a");
}

#[tokio::test]
async fn test_get_sends_no_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/crawl/status/job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "running"})))
        .mount(&mock_server)
        .await;

    let transport = transport_for(&config_for(&mock_server));
    let body = transport.get("/crawl/status/job-1").await.unwrap();
    assert_eq!(body["status"], "running");

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].body.is_empty());
}

#[tokio::test]
async fn test_http_error_keeps_status_and_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/crawl"))
        .respond_with(ResponseTemplate::new(402).set_body_string("Payment Required"))
        .mount(&mock_server)
        .await;

    let transport = transport_for(&config_for(&mock_server));
    let err = transport
        .post("/crawl", &json!({"url": "https://example.com"}))
        .await
        .unwrap_err();

    match err {
        TransportError::Http { status, body } => {
            assert_eq!(status, 402);
            assert_eq!(body, "Payment Required");
        }
        other => panic!("expected HTTP error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_non_json_success_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/llmstxt/t-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let transport = transport_for(&config_for(&mock_server));
    let err = transport.get("/llmstxt/t-1").await.unwrap_err();

    assert!(matches!(err, TransportError::Decode(ref msg) if msg.contains("maintenance")));
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let client = build_http_client(&TransportConfig {
        timeout_secs: 2,
        connect_timeout_secs: 1,
    })
    .unwrap();
    let transport = HttpTransport::new(client, "http://127.0.0.1:1/v1", TOKEN);

    let err = transport.get("/crawl/status/x").await.unwrap_err();
    assert!(matches!(err, TransportError::Network { .. }));
}
