use crate::config::types::{ApiConfig, Config, PollerConfig, ScrapeConfig, TransportConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_api_config(&config.api)?;
    validate_transport_config(&config.transport)?;
    validate_poller_config(&config.poller)?;
    validate_scrape_config(&config.scrape)?;
    Ok(())
}

/// Validates the provider endpoint and token
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    match config.token.as_deref().map(str::trim) {
        Some(token) if !token.is_empty() => Ok(()),
        _ => Err(ConfigError::MissingToken),
    }
}

/// Validates HTTP client timeouts
fn validate_transport_config(config: &TransportConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "connect_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates the polling budget
fn validate_poller_config(config: &PollerConfig) -> Result<(), ConfigError> {
    if config.interval_ms < 1 || config.interval_ms > 600_000 {
        return Err(ConfigError::Validation(format!(
            "interval_ms must be between 1 and 600000, got {}",
            config.interval_ms
        )));
    }

    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.max_duration_secs == Some(0) {
        return Err(ConfigError::Validation(
            "max_duration_secs must be >= 1 when set".to_string(),
        ));
    }

    if config.max_consecutive_failures == Some(0) {
        return Err(ConfigError::Validation(
            "max_consecutive_failures must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates parallel scrape limits
fn validate_scrape_config(config: &ScrapeConfig) -> Result<(), ConfigError> {
    if config.max_concurrency < 1 || config.max_concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrency must be between 1 and 100, got {}",
            config.max_concurrency
        )));
    }

    Ok(())
}
