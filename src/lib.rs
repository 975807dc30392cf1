//! Firedash: a job client for a hosted web-scraping API
//!
//! This crate submits map, crawl, batch-scrape, search, deep-research and
//! text-export jobs to the provider, polls long-running jobs until they reach a
//! terminal state, and reshapes the provider's responses into uniform records.

pub mod config;
pub mod jobs;
pub mod normalize;
pub mod output;
pub mod poller;
pub mod scrape;
pub mod state;
pub mod transport;

use std::time::Duration;
use thiserror::Error;

/// Main error type for Firedash operations
#[derive(Debug, Error)]
pub enum FiredashError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Submit error: {0}")]
    Submit(#[from] SubmitError),

    #[error("Poll error: {0}")]
    Poll(#[from] PollError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to load .env file: {0}")]
    EnvFile(#[from] dotenvy::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("API token is missing (set FIRECRAWL_API_KEY or api.token)")]
    MissingToken,
}

/// Bad or missing request input, caught before any network call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Failures of a single HTTP exchange with the provider
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Network error: {cause}")]
    Network { cause: String },

    #[error("Failed to decode response body: {0}")]
    Decode(String),

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

/// Errors raised while submitting a job
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Request rejected by provider: {message}")]
    Rejected { message: String },

    #[error("Provider accepted the {operation} job but returned no job id")]
    MissingJobId { operation: jobs::OperationKind },
}

/// Errors raised while polling a submitted job
#[derive(Debug, Error)]
pub enum PollError {
    #[error("Job failed: {message}")]
    JobFailed { message: String },

    #[error("Job still running after {attempts} status checks ({elapsed:?})")]
    TimedOut { attempts: u32, elapsed: Duration },

    #[error("Status checks kept failing after {attempts} attempts: {source}")]
    Transport {
        attempts: u32,
        #[source]
        source: TransportError,
    },

    #[error("Polling was cancelled")]
    Cancelled,

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::JobState,
        to: state::JobState,
    },
}

/// Result type alias for Firedash operations
pub type Result<T> = std::result::Result<T, FiredashError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for transport operations
pub type TransportResult<T> = std::result::Result<T, TransportError>;

// Re-export commonly used types
pub use config::Config;
pub use jobs::{JobRequest, JobRunner, OperationKind, SubmitOutcome, Submitter};
pub use normalize::{normalize, NormalizedRecord};
pub use poller::{PollBudget, Poller};
pub use state::{JobHandle, JobState, JobStatus, Progress};
pub use transport::{HttpTransport, Transport};
