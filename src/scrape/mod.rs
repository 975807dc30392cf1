//! Bounded-parallel one-shot scrapes
//!
//! Each URL gets its own `POST /scrape` call. At most `concurrency` calls are
//! in flight at once and results come back in completion order, so every
//! outcome carries the URL it was requested for.

use crate::jobs::{rejection, scrape_payload, PageOptions};
use crate::normalize::{normalize_page, MalformedRecord, NormalizedRecord};
use crate::transport::Transport;
use crate::SubmitError;
use futures::stream::{self, StreamExt};
use thiserror::Error;

/// Endpoint for single-page scrapes
pub const SCRAPE_PATH: &str = "/scrape";

/// Why a single scrape produced no record
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error(transparent)]
    Malformed(#[from] MalformedRecord),
}

/// Result of scraping one URL
#[derive(Debug)]
pub struct ScrapeOutcome {
    /// The URL as requested (trimmed)
    pub url: String,
    pub result: Result<NormalizedRecord, ScrapeError>,
}

/// Scrapes every URL with at most `concurrency` requests in flight
///
/// Returns one outcome per input URL, in completion order.
pub async fn scrape_many<T, S>(
    transport: &T,
    urls: &[S],
    options: &PageOptions,
    concurrency: usize,
) -> Vec<ScrapeOutcome>
where
    T: Transport + ?Sized,
    S: AsRef<str>,
{
    let concurrency = concurrency.max(1);
    tracing::info!("Scraping {} URLs, {} at a time", urls.len(), concurrency);

    let outcomes: Vec<ScrapeOutcome> = stream::iter(urls.iter())
        .map(|url| {
            let url = url.as_ref().trim().to_string();
            async move {
                let result = scrape_one(transport, &url, options).await;
                if let Err(e) = &result {
                    tracing::warn!("Scrape of {} failed: {}", url, e);
                }
                ScrapeOutcome { url, result }
            }
        })
        .buffer_unordered(concurrency)
        .collect()
        .await;

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    tracing::info!(
        "Scraped {} of {} URLs",
        outcomes.len() - failed,
        outcomes.len()
    );
    outcomes
}

/// Scrapes a single URL into a record tagged with its source URL
pub async fn scrape_one<T>(
    transport: &T,
    url: &str,
    options: &PageOptions,
) -> Result<NormalizedRecord, ScrapeError>
where
    T: Transport + ?Sized,
{
    let payload = scrape_payload(url, options).map_err(SubmitError::from)?;
    tracing::debug!("Scraping {}", url);

    let body = transport
        .post(SCRAPE_PATH, &payload)
        .await
        .map_err(SubmitError::from)?;

    if let Some(message) = rejection(&body) {
        return Err(SubmitError::Rejected { message }.into());
    }

    Ok(normalize_page(&body, url.trim())?)
}
