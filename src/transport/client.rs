//! reqwest-backed transport implementation
//!
//! This module handles all HTTP requests to the provider, including:
//! - Building the HTTP client with timeouts and a user agent
//! - Attaching the bearer token and JSON content type
//! - Classifying failures into HTTP, network and decode errors

use crate::config::{Config, TransportConfig};
use crate::transport::{Method, Transport};
use crate::{TransportError, TransportResult};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use firedash::config::TransportConfig;
/// use firedash::transport::build_http_client;
///
/// let client = build_http_client(&TransportConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &TransportConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    Client::builder()
        .user_agent(concat!("firedash/", env!("CARGO_PKG_VERSION")))
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// HTTP transport bound to one base URL and bearer token
///
/// The base URL and token are fixed at construction and never mutated, so a
/// single instance can be shared across any number of pollers.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpTransport {
    /// Creates a transport from an existing client
    pub fn new(client: Client, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            token: token.into(),
        }
    }

    /// Creates a transport from the process configuration
    pub fn from_config(config: &Config) -> TransportResult<Self> {
        let client = build_http_client(&config.transport).map_err(|e| TransportError::Network {
            cause: format!("failed to build HTTP client: {}", e),
        })?;
        Ok(Self::new(client, config.api.base_url.clone(), config.token()))
    }

    /// The base URL every request path is appended to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins a relative path onto the base URL
    pub fn endpoint(&self, path: &str) -> TransportResult<reqwest::Url> {
        let joined = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        reqwest::Url::parse(&joined)
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {}", joined, e)))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> TransportResult<Value> {
        let url = self.endpoint(path)?;
        tracing::trace!("{} {}", method, url);

        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .bearer_auth(&self.token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(classify_network_error)?;
        let status = response.status();
        let text = response.text().await.map_err(classify_network_error)?;

        if !status.is_success() {
            tracing::debug!("{} {} returned HTTP {}", method, url, status.as_u16());
            return Err(TransportError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        decode_body(&text)
    }
}

/// Parses a successful response body as JSON
fn decode_body(text: &str) -> TransportResult<Value> {
    serde_json::from_str(text).map_err(|e| {
        let preview: String = text.chars().take(120).collect();
        TransportError::Decode(format!("{} (body starts with {:?})", e, preview))
    })
}

/// Maps a reqwest failure below the HTTP layer to a network error
fn classify_network_error(e: reqwest::Error) -> TransportError {
    let cause = if e.is_timeout() {
        format!("request timeout: {}", e)
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        e.to_string()
    };
    TransportError::Network { cause }
}
