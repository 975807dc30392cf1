use serde::Deserialize;

/// Default provider endpoint, including the API version segment
pub const DEFAULT_BASE_URL: &str = "https://api.firecrawl.dev/v1";

/// Main configuration structure for Firedash
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub transport: TransportConfig,
    pub poller: PollerConfig,
    pub scrape: ScrapeConfig,
}

/// Provider endpoint and credentials
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL that every request path is appended to
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Bearer token sent with every request
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
        }
    }
}

/// HTTP client behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            connect_timeout_secs: 10,
        }
    }
}

/// Job status polling behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    /// Fixed wait between status checks (milliseconds)
    #[serde(rename = "interval-ms")]
    pub interval_ms: u64,

    /// Maximum number of status checks per job
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Optional wall-clock budget per job (seconds)
    #[serde(rename = "max-duration-secs")]
    pub max_duration_secs: Option<u64>,

    /// Optional cap on back-to-back failed status checks
    #[serde(rename = "max-consecutive-failures")]
    pub max_consecutive_failures: Option<u32>,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5_000,
            max_attempts: 60,
            max_duration_secs: None,
            max_consecutive_failures: None,
        }
    }
}

/// Parallel one-shot scrape behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Maximum number of scrape requests in flight
    #[serde(rename = "max-concurrency")]
    pub max_concurrency: u32,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 10,
        }
    }
}
