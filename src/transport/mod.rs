//! Transport layer for talking to the provider API
//!
//! Every call is JSON over HTTP(S) to a single base URL with a bearer token.
//! The [`Transport`] trait is the seam the submitter, poller and parallel
//! scraper are written against; [`HttpTransport`] is the reqwest-backed
//! implementation.
//!
//! No retries happen at this layer. Retry policy for status checks lives in
//! the poller.

mod client;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{build_http_client, HttpTransport};
pub use reqwest::Method;

use crate::TransportResult;
use async_trait::async_trait;
use serde_json::Value;

/// A JSON request/response exchange with the provider
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends one request and decodes the JSON response
    ///
    /// # Arguments
    ///
    /// * `method` - HTTP method
    /// * `path` - Path relative to the configured base URL (e.g. `/crawl`)
    /// * `body` - Optional JSON body
    ///
    /// # Returns
    ///
    /// * `Ok(Value)` - 2xx response with a JSON body
    /// * `Err(TransportError)` - HTTP, network or decode failure
    async fn send(&self, method: Method, path: &str, body: Option<&Value>)
        -> TransportResult<Value>;

    /// Sends a `GET` request without a body
    async fn get(&self, path: &str) -> TransportResult<Value> {
        self.send(Method::GET, path, None).await
    }

    /// Sends a `POST` request with a JSON body
    async fn post(&self, path: &str, body: &Value) -> TransportResult<Value> {
        self.send(Method::POST, path, Some(body)).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> TransportResult<Value> {
        (**self).send(method, path, body).await
    }
}
