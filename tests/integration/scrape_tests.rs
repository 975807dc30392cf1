//! Parallel one-shot scrapes against a mock provider

use crate::common::{config_for, transport_for};
use firedash::jobs::{Format, PageOptions};
use firedash::scrape::{scrape_many, ScrapeError};
use firedash::SubmitError;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_page(server: &MockServer, url: &str, delay_ms: u64, markdown: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .and(body_partial_json(json!({"url": url})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "success": true,
                    "data": {"markdown": markdown, "metadata": {"title": markdown, "statusCode": 200}}
                }))
                .set_delay(Duration::from_millis(delay_ms)),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_results_are_tagged_with_their_url() {
    let mock_server = MockServer::start().await;

    // The first URL answers last so completion order differs from input order.
    mount_page(&mock_server, "https://slow.example", 300, "slow").await;
    mount_page(&mock_server, "https://fast.example", 0, "fast").await;
    mount_page(&mock_server, "https://medium.example", 100, "medium").await;

    let config = config_for(&mock_server);
    let transport = transport_for(&config);
    let urls = [
        "https://slow.example",
        "https://fast.example",
        "https://medium.example",
    ];

    let outcomes = scrape_many(transport.as_ref(), &urls, &PageOptions::default(), 3).await;

    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0].url, "https://fast.example");
    assert_eq!(outcomes[2].url, "https://slow.example");
    for outcome in &outcomes {
        let record = outcome.result.as_ref().unwrap();
        assert_eq!(record.url, outcome.url);
        assert!(outcome.url.contains(&record.markdown));
    }
}

#[tokio::test]
async fn test_scrape_payload_and_failures() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "https://ok.example", 0, "ok").await;
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .and(body_partial_json(json!({"url": "https://blocked.example"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": false, "error": "Blocked by robots.txt"})),
        )
        .mount(&mock_server)
        .await;

    let config = config_for(&mock_server);
    let transport = transport_for(&config);
    let options = PageOptions {
        formats: vec![Format::Markdown, Format::Links],
        wait_for_ms: Some(1_000),
        ..Default::default()
    };
    let urls = vec!["https://ok.example".to_string(), "https://blocked.example".to_string()];

    let outcomes = scrape_many(
        transport.as_ref(),
        &urls,
        &options,
        config.scrape.max_concurrency as usize,
    )
    .await;

    let ok = outcomes.iter().find(|o| o.url == "https://ok.example").unwrap();
    assert_eq!(ok.result.as_ref().unwrap().markdown, "ok");

    let blocked = outcomes
        .iter()
        .find(|o| o.url == "https://blocked.example")
        .unwrap();
    assert!(matches!(
        blocked.result,
        Err(ScrapeError::Submit(SubmitError::Rejected { ref message })) if message == "Blocked by robots.txt"
    ));

    let requests = mock_server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["formats"], json!(["markdown", "links"]));
    assert_eq!(body["waitFor"], 1000);
    assert_eq!(body["onlyMainContent"], true);
    assert_eq!(body["blockAds"], true);
}
