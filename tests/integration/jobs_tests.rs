//! Submit and poll cycles against a mock provider

use crate::common::{config_for, transport_for};
use firedash::jobs::{CrawlOptions, PageOptions, SearchOptions, TextExportOptions};
use firedash::normalize::{normalize, research_report, text_export, NormalizedRecord};
use firedash::output::{combined_markdown, page_file_name, write_page_files};
use firedash::{FiredashError, JobRequest, JobRunner, JobState, PollError, SubmitError, TransportError};
use serde_json::{json, Map, Value};
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mounts one GET response per status body, served in order
async fn mount_status_sequence(server: &MockServer, status_path: &str, bodies: Vec<Value>) {
    for body in bodies {
        Mock::given(method("GET"))
            .and(path(status_path))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .up_to_n_times(1)
            .mount(server)
            .await;
    }
}

async fn mount_submit(server: &MockServer, submit_path: &str, response: Value) {
    Mock::given(method("POST"))
        .and(path(submit_path))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .mount(server)
        .await;
}

fn runner_for(server: &MockServer) -> JobRunner<firedash::HttpTransport> {
    let config = config_for(server);
    JobRunner::new(transport_for(&config), config.poll_budget())
}

async fn request_bodies(server: &MockServer, request_path: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == request_path)
        .map(|r| serde_json::from_slice(&r.body).unwrap_or(Value::Null))
        .collect()
}

#[tokio::test]
async fn test_crawl_end_to_end() {
    let mock_server = MockServer::start().await;

    mount_submit(&mock_server, "/v1/crawl", json!({"id": "job-1"})).await;
    mount_status_sequence(
        &mock_server,
        "/v1/crawl/status/job-1",
        vec![
            json!({"status": "queued"}),
            json!({"status": "running", "progress": 50}),
            json!({
                "status": "completed",
                "data": [{"content": {"url": "https://example.com", "markdown": "hi"}}]
            }),
        ],
    )
    .await;

    let runner = runner_for(&mock_server);
    let options = CrawlOptions {
        limit: 10,
        ..Default::default()
    };

    let mut states = Vec::new();
    let payload = runner
        .run(&JobRequest::crawl("https://example.com", options), |p| {
            states.push(p.status.state())
        })
        .await
        .unwrap();

    assert_eq!(
        normalize(&payload),
        vec![NormalizedRecord {
            url: "https://example.com".to_string(),
            title: "untitled".to_string(),
            markdown: "hi".to_string(),
            html: String::new(),
            metadata: Map::new(),
        }]
    );
    assert_eq!(states, vec![JobState::Queued, JobState::Running]);

    let submitted = request_bodies(&mock_server, "/v1/crawl").await;
    assert_eq!(
        submitted,
        vec![json!({
            "url": "https://example.com",
            "limit": 10,
            "scrapeOptions": {"formats": ["markdown"], "onlyMainContent": true}
        })]
    );
    assert_eq!(request_bodies(&mock_server, "/v1/crawl/status/job-1").await.len(), 3);
}

#[tokio::test]
async fn test_batch_scrape_end_to_end() {
    let mock_server = MockServer::start().await;

    mount_submit(
        &mock_server,
        "/v1/batch/scrape",
        json!({"success": true, "id": "b-1", "invalidURLs": []}),
    )
    .await;
    mount_status_sequence(
        &mock_server,
        "/v1/batch/scrape/b-1",
        vec![
            json!({"status": "scraping", "completed": 1, "total": 2}),
            json!({
                "status": "completed",
                "completed": 2,
                "total": 2,
                "data": [
                    {"markdown": "# A", "metadata": {"sourceURL": "https://a.example", "title": "A", "statusCode": 200}},
                    {"markdown": "# B", "metadata": {"sourceURL": "https://b.example", "statusCode": 200}}
                ]
            }),
        ],
    )
    .await;

    let runner = runner_for(&mock_server);
    let request = JobRequest::batch_scrape(
        &["https://a.example", "", "https://b.example"],
        PageOptions::default(),
    );

    let payload = runner.run(&request, |_| {}).await.unwrap();
    let records = normalize(&payload);

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].url, "https://a.example");
    assert_eq!(records[0].title, "A");
    assert_eq!(records[1].title, "untitled");
    assert_eq!(
        combined_markdown(&records),
        "# A\n\n# A\n\n---\n\n# untitled\n\n# B"
    );

    let submitted = request_bodies(&mock_server, "/v1/batch/scrape").await;
    assert_eq!(
        submitted[0]["urls"],
        json!(["https://a.example", "https://b.example"])
    );

    let temp = TempDir::new().unwrap();
    let written = write_page_files(&records, temp.path()).unwrap();
    assert_eq!(written.len(), 2);
    assert_eq!(
        std::fs::read_to_string(temp.path().join(page_file_name("https://b.example"))).unwrap(),
        "# B"
    );
}

#[tokio::test]
async fn test_failed_job_is_reported() {
    let mock_server = MockServer::start().await;

    mount_submit(&mock_server, "/v1/crawl", json!({"success": true, "id": "job-2"})).await;
    mount_status_sequence(
        &mock_server,
        "/v1/crawl/status/job-2",
        vec![
            json!({"status": "running"}),
            json!({"status": "failed", "error": "Crawl blocked"}),
        ],
    )
    .await;

    let runner = runner_for(&mock_server);
    let err = runner
        .run(
            &JobRequest::crawl("https://example.com", CrawlOptions::default()),
            |_| {},
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        FiredashError::Poll(PollError::JobFailed { ref message }) if message == "Crawl blocked"
    ));
    assert_eq!(request_bodies(&mock_server, "/v1/crawl/status/job-2").await.len(), 2);
}

#[tokio::test]
async fn test_transient_status_errors_are_tolerated() {
    let mock_server = MockServer::start().await;

    mount_submit(&mock_server, "/v1/llmstxt", json!({"success": true, "id": "t-1"})).await;
    Mock::given(method("GET"))
        .and(path("/v1/llmstxt/t-1"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;
    mount_status_sequence(
        &mock_server,
        "/v1/llmstxt/t-1",
        vec![json!({
            "status": "completed",
            "data": {"llmstxt": "# Example", "llmsfulltxt": "# Example\n\nAll of it"}
        })],
    )
    .await;

    let runner = runner_for(&mock_server);
    let payload = runner
        .run(
            &JobRequest::text_export("https://example.com", TextExportOptions::default()),
            |_| {},
        )
        .await
        .unwrap();

    let export = text_export(&payload);
    assert_eq!(export.llmstxt, "# Example");
    assert_eq!(export.llms_full_txt.as_deref(), Some("# Example\n\nAll of it"));
}

#[tokio::test]
async fn test_text_export_inline_result_is_not_polled() {
    let mock_server = MockServer::start().await;

    mount_submit(
        &mock_server,
        "/v1/llmstxt",
        json!({"success": true, "data": {"llmstxt": "# Inline"}}),
    )
    .await;

    let runner = runner_for(&mock_server);
    let options = TextExportOptions {
        max_urls: 500,
        show_full_text: false,
    };
    let payload = runner
        .run(&JobRequest::text_export("https://example.com", options), |_| {})
        .await
        .unwrap();

    assert_eq!(text_export(&payload).llmstxt, "# Inline");
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);

    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["maxUrls"], 100);
    assert_eq!(body["showFullText"], false);
}

#[tokio::test]
async fn test_rejected_submit() {
    let mock_server = MockServer::start().await;

    mount_submit(
        &mock_server,
        "/v1/crawl",
        json!({"success": false, "error": "Insufficient credits"}),
    )
    .await;

    let runner = runner_for(&mock_server);
    let err = runner
        .run(
            &JobRequest::crawl("https://example.com", CrawlOptions::default()),
            |_| {},
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        FiredashError::Submit(SubmitError::Rejected { ref message }) if message == "Insufficient credits"
    ));
}

#[tokio::test]
async fn test_submit_transport_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/crawl"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&mock_server)
        .await;

    let runner = runner_for(&mock_server);
    let err = runner
        .run(
            &JobRequest::crawl("https://example.com", CrawlOptions::default()),
            |_| {},
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        FiredashError::Submit(SubmitError::Transport(TransportError::Http { status: 500, .. }))
    ));
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_request_never_reaches_provider() {
    let mock_server = MockServer::start().await;

    let runner = runner_for(&mock_server);
    let err = runner
        .run(&JobRequest::crawl("", CrawlOptions::default()), |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, FiredashError::Submit(SubmitError::Validation(_))));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_is_immediate() {
    let mock_server = MockServer::start().await;

    mount_submit(
        &mock_server,
        "/v1/search",
        json!({
            "success": true,
            "data": [
                {"url": "https://docs.rs", "title": "Docs.rs", "description": "Rust docs", "markdown": "# Docs"},
                {"url": "https://crates.io", "title": "crates.io", "description": "Registry"}
            ]
        }),
    )
    .await;

    let runner = runner_for(&mock_server);
    let payload = runner
        .run(&JobRequest::search("rust crates", SearchOptions::default()), |_| {})
        .await
        .unwrap();
    let records = normalize(&payload);

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].metadata["description"], "Rust docs");
    assert_eq!(records[1].markdown, "");

    let submitted = request_bodies(&mock_server, "/v1/search").await;
    assert_eq!(submitted[0]["query"], "rust crates");
    assert_eq!(submitted[0]["limit"], 5);
}

#[tokio::test]
async fn test_deep_research_reports_activity() {
    let mock_server = MockServer::start().await;

    mount_submit(&mock_server, "/v1/deep-research", json!({"success": true, "id": "r-1"})).await;
    mount_status_sequence(
        &mock_server,
        "/v1/deep-research/r-1",
        vec![
            json!({
                "status": "processing",
                "currentDepth": 1,
                "maxDepth": 3,
                "data": {"activities": [{"type": "search", "message": "Searching the web"}]}
            }),
            json!({
                "status": "completed",
                "data": {
                    "finalAnalysis": "Rust is memory safe.",
                    "sources": [{"url": "https://rust-lang.org", "title": "Rust"}]
                }
            }),
        ],
    )
    .await;

    let runner = runner_for(&mock_server);
    let mut activities = Vec::new();
    let payload = runner
        .run(&JobRequest::deep_research("Is Rust safe?", Default::default()), |p| {
            activities.push((p.status.progress.as_ref().map(|p| p.to_string()), p.status.activity.clone()))
        })
        .await
        .unwrap();

    assert_eq!(
        activities,
        vec![(
            Some("depth 1/3".to_string()),
            Some("search - Searching the web".to_string())
        )]
    );

    let report = research_report(&payload);
    assert_eq!(report.final_analysis, "Rust is memory safe.");
    assert_eq!(report.sources[0].url, "https://rust-lang.org");
}

#[tokio::test]
async fn test_cancelled_poll_stops_requests() {
    let mock_server = MockServer::start().await;

    mount_submit(&mock_server, "/v1/crawl", json!({"success": true, "id": "slow"})).await;
    Mock::given(method("GET"))
        .and(path("/v1/crawl/status/slow"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "running"})))
        .mount(&mock_server)
        .await;

    let token = CancellationToken::new();
    let runner = runner_for(&mock_server).with_cancellation(token.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
    });

    let err = runner
        .run(
            &JobRequest::crawl("https://example.com", CrawlOptions::default()),
            |_| {},
        )
        .await
        .unwrap_err();
    canceller.await.unwrap();

    assert!(matches!(err, FiredashError::Poll(PollError::Cancelled)));
    let polls = request_bodies(&mock_server, "/v1/crawl/status/slow").await.len();
    assert!(polls >= 1 && polls < 20);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(
        request_bodies(&mock_server, "/v1/crawl/status/slow").await.len(),
        polls
    );
}
