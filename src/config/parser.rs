use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Environment variable holding the provider base URL
pub const ENV_API_URL: &str = "FIRECRAWL_API_URL";

/// Environment variable holding the provider bearer token
pub const ENV_API_KEY: &str = "FIRECRAWL_API_KEY";

/// Loads and parses a configuration file from the given path
///
/// The file is parsed and validated as-is; no environment overrides are
/// applied. Use [`resolve_config`] for the full startup sequence.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use firedash::config::load_config;
///
/// let config = load_config(Path::new("firedash.toml")).unwrap();
/// println!("Polling every {}ms", config.poller.interval_ms);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let config = read_config_file(path)?;
    validate(&config)?;
    Ok(config)
}

/// Parses configuration from a TOML string without validating it
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Overrides the base URL and token from an environment lookup
///
/// Blank values are ignored so an empty variable never wipes a configured
/// token.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
        tracing::debug!("Using base URL from {}", ENV_API_URL);
        config.api.base_url = url.trim().to_string();
    }

    if let Some(token) = lookup(ENV_API_KEY).filter(|v| !v.trim().is_empty()) {
        tracing::debug!("Using API token from {}", ENV_API_KEY);
        config.api.token = Some(token.trim().to_string());
    }
}

/// Builds the process configuration
///
/// 1. Reads the optional TOML file (defaults otherwise)
/// 2. Loads a `.env` file from the working directory, if any; a malformed
///    one is an error
/// 3. Applies `FIRECRAWL_API_URL` / `FIRECRAWL_API_KEY` overrides
/// 4. Validates the result
pub fn resolve_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(path) => read_config_file(path)?,
        None => Config::default(),
    };

    load_env_file(Path::new(".env"))?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate(&config)?;

    Ok(config)
}

/// Loads variables from an env file into the process environment
///
/// # Returns
///
/// * `Ok(true)` - The file was read
/// * `Ok(false)` - There is no file at `path`
/// * `Err(ConfigError)` - The file exists but could not be read or parsed
fn load_env_file(path: &Path) -> Result<bool, ConfigError> {
    match dotenvy::from_path(path) {
        Ok(()) => {
            tracing::debug!("Loaded environment from {}", path.display());
            Ok(true)
        }
        Err(e) if e.not_found() => Ok(false),
        Err(e) => Err(e.into()),
    }
}

fn read_config_file(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}
