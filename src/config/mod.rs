//! Configuration module for Firedash
//!
//! This module handles loading the optional TOML configuration file, applying
//! environment overrides for the provider URL and token, and validating the
//! result.
//!
//! # Example
//!
//! ```no_run
//! use firedash::config::resolve_config;
//!
//! let config = resolve_config(None).unwrap();
//! println!("Talking to {}", config.api.base_url);
//! ```

mod parser;
mod types;
mod validation;

use crate::poller::PollBudget;
use std::time::Duration;

// Re-export types
pub use types::{
    ApiConfig, Config, PollerConfig, ScrapeConfig, TransportConfig, DEFAULT_BASE_URL,
};

// Re-export parser functions
pub use parser::{
    apply_env_overrides, load_config, parse_config, resolve_config, ENV_API_KEY, ENV_API_URL,
};

impl Config {
    /// Derives the per-job polling budget from the `[poller]` section
    pub fn poll_budget(&self) -> PollBudget {
        let mut budget = PollBudget::new(
            Duration::from_millis(self.poller.interval_ms),
            self.poller.max_attempts,
        );
        if let Some(secs) = self.poller.max_duration_secs {
            budget = budget.with_max_duration(Duration::from_secs(secs));
        }
        if let Some(max) = self.poller.max_consecutive_failures {
            budget = budget.with_max_consecutive_failures(max);
        }
        budget
    }

    /// Returns the configured bearer token, or an empty string when unset
    pub fn token(&self) -> &str {
        self.api.token.as_deref().unwrap_or_default()
    }
}
