//! Shared helpers for the integration tests

use firedash::config::{load_config, Config};
use firedash::HttpTransport;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;
use wiremock::MockServer;

pub const TOKEN: &str = "fc-test-token";

/// Writes a config file pointing at `server` and loads it the way the CLI does
pub fn config_for(server: &MockServer) -> Config {
    let mut file = NamedTempFile::new().expect("Failed to create temp config");
    write!(
        file,
        r#"
[api]
base-url = "{}/v1"
token = "{}"

[transport]
timeout-secs = 5
connect-timeout-secs = 2

[poller]
interval-ms = 10
max-attempts = 20

[scrape]
max-concurrency = 4
"#,
        server.uri(),
        TOKEN
    )
    .expect("Failed to write temp config");

    load_config(file.path()).expect("Failed to load test config")
}

pub fn transport_for(config: &Config) -> Arc<HttpTransport> {
    Arc::new(HttpTransport::from_config(config).expect("Failed to build transport"))
}
