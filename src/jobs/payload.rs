//! Request payload building and input validation
//!
//! Each operation has its own recognized option set. Optional fields that are
//! unset or empty are left out of the payload rather than sent as `null`, and
//! every bound is checked before any network call is made.

use crate::jobs::request::{
    CrawlOptions, DeepResearchOptions, Format, JobOptions, JobRequest, Location, MapOptions,
    PageOptions, SearchOptions, TextExportOptions,
};
use crate::ValidationError;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use url::Url;

/// Hard cap on URLs for a text export; larger requests are clamped
pub const TEXT_EXPORT_MAX_URLS: u32 = 100;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MapPayload<'a> {
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    search: Option<&'a str>,
    ignore_sitemap: bool,
    sitemap_only: bool,
    include_subdomains: bool,
    limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout: Option<u64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeOptionsPayload<'a> {
    formats: &'a [Format],
    #[serde(skip_serializing_if = "Option::is_none")]
    only_main_content: Option<bool>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CrawlPayload<'a> {
    url: &'a str,
    limit: u32,
    scrape_options: ScrapeOptionsPayload<'a>,
}

/// Page rendering fields, flattened into batch and one-shot scrape payloads
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageFields<'a> {
    formats: &'a [Format],
    only_main_content: bool,
    block_ads: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    wait_for: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout: Option<u64>,
    #[serde(skip_serializing_if = "is_empty_list")]
    include_tags: &'a [String],
    #[serde(skip_serializing_if = "is_empty_list")]
    exclude_tags: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    actions: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<&'a Location>,
    #[serde(skip_serializing_if = "is_empty_map")]
    headers: &'a BTreeMap<String, String>,
}

#[derive(Serialize)]
struct BatchScrapePayload<'a> {
    urls: Vec<&'a str>,
    #[serde(flatten)]
    page: PageFields<'a>,
}

#[derive(Serialize)]
struct ScrapePayload<'a> {
    url: &'a str,
    #[serde(flatten)]
    page: PageFields<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchPayload<'a> {
    query: &'a str,
    limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    lang: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    country: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tbs: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout: Option<u64>,
    scrape_options: ScrapeOptionsPayload<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeepResearchPayload<'a> {
    query: &'a str,
    max_depth: u32,
    time_limit: u32,
    max_urls: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TextExportPayload<'a> {
    url: &'a str,
    max_urls: u32,
    show_full_text: bool,
}

impl JobRequest {
    /// Validates the request and builds its JSON payload
    ///
    /// # Returns
    ///
    /// * `Ok(Value)` - Payload ready to POST to the operation's submit path
    /// * `Err(ValidationError)` - A field is missing or out of bounds
    pub fn build_payload(&self) -> Result<Value, ValidationError> {
        let target = self.target().trim();
        if target.is_empty() {
            return Err(ValidationError::new("target", "must not be empty"));
        }

        match self.options() {
            JobOptions::Map(options) => map_payload(target, options),
            JobOptions::Crawl(options) => crawl_payload(target, options),
            JobOptions::BatchScrape(options) => batch_scrape_payload(&self.target_lines(), options),
            JobOptions::Search(options) => search_payload(target, options),
            JobOptions::DeepResearch(options) => deep_research_payload(target, options),
            JobOptions::TextExport(options) => text_export_payload(target, options),
        }
    }
}

fn map_payload(target: &str, options: &MapOptions) -> Result<Value, ValidationError> {
    let url = validate_url("url", target)?;
    check_range("limit", options.limit, 1..=5_000)?;
    if options.sitemap_only && options.ignore_sitemap {
        return Err(ValidationError::new(
            "sitemap_only",
            "cannot be combined with ignore_sitemap",
        ));
    }

    to_value(&MapPayload {
        url,
        search: non_empty(&options.search),
        ignore_sitemap: options.ignore_sitemap,
        sitemap_only: options.sitemap_only,
        include_subdomains: options.include_subdomains,
        limit: options.limit,
        timeout: non_zero(options.timeout_ms),
    })
}

fn crawl_payload(target: &str, options: &CrawlOptions) -> Result<Value, ValidationError> {
    let url = validate_url("url", target)?;
    check_range("limit", options.limit, 1..=10_000)?;
    if options.formats.is_empty() {
        return Err(ValidationError::new("formats", "at least one format is required"));
    }

    to_value(&CrawlPayload {
        url,
        limit: options.limit,
        scrape_options: ScrapeOptionsPayload {
            formats: &options.formats,
            only_main_content: Some(options.only_main_content),
        },
    })
}

fn batch_scrape_payload(lines: &[&str], options: &PageOptions) -> Result<Value, ValidationError> {
    if lines.is_empty() {
        return Err(ValidationError::new("urls", "at least one URL is required"));
    }
    let urls = lines
        .iter()
        .map(|line| validate_url("urls", line))
        .collect::<Result<Vec<_>, _>>()?;

    to_value(&BatchScrapePayload {
        urls,
        page: page_fields(options)?,
    })
}

/// Builds the payload for a one-shot `/scrape` call
pub(crate) fn scrape_payload(target: &str, options: &PageOptions) -> Result<Value, ValidationError> {
    let url = validate_url("url", target.trim())?;
    to_value(&ScrapePayload {
        url,
        page: page_fields(options)?,
    })
}

fn page_fields(options: &PageOptions) -> Result<PageFields<'_>, ValidationError> {
    if options.formats.is_empty() {
        return Err(ValidationError::new("formats", "at least one format is required"));
    }

    let wait_for = non_zero(options.wait_for_ms);
    let timeout = non_zero(options.timeout_ms);
    if let (Some(wait_for), Some(timeout)) = (wait_for, timeout) {
        if wait_for >= timeout {
            return Err(ValidationError::new(
                "wait_for_ms",
                format!("must be less than timeout ({}ms >= {}ms)", wait_for, timeout),
            ));
        }
    }

    if let Some(actions) = &options.actions {
        if !actions.is_array() {
            return Err(ValidationError::new("actions", "must be a JSON array"));
        }
    }

    if let Some(location) = &options.location {
        if location.country.trim().is_empty() {
            return Err(ValidationError::new("location", "country must not be empty"));
        }
    }

    Ok(PageFields {
        formats: &options.formats,
        only_main_content: options.only_main_content,
        block_ads: options.block_ads,
        wait_for,
        timeout,
        include_tags: &options.include_tags,
        exclude_tags: &options.exclude_tags,
        actions: options.actions.as_ref(),
        location: options.location.as_ref(),
        headers: &options.headers,
    })
}

fn search_payload(query: &str, options: &SearchOptions) -> Result<Value, ValidationError> {
    check_range("limit", options.limit, 1..=10)?;
    let formats: &[Format] = if options.scrape_markdown {
        &[Format::Markdown]
    } else {
        &[]
    };

    to_value(&SearchPayload {
        query,
        limit: options.limit,
        lang: non_empty(&options.lang),
        country: non_empty(&options.country),
        location: non_empty(&options.location),
        tbs: non_empty(&options.tbs),
        timeout: non_zero(options.timeout_ms),
        scrape_options: ScrapeOptionsPayload {
            formats,
            only_main_content: None,
        },
    })
}

fn deep_research_payload(
    query: &str,
    options: &DeepResearchOptions,
) -> Result<Value, ValidationError> {
    check_range("max_depth", options.max_depth, 1..=10)?;
    check_range("time_limit_secs", options.time_limit_secs, 30..=600)?;
    check_range("max_urls", options.max_urls, 1..=1_000)?;

    to_value(&DeepResearchPayload {
        query,
        max_depth: options.max_depth,
        time_limit: options.time_limit_secs,
        max_urls: options.max_urls,
    })
}

fn text_export_payload(target: &str, options: &TextExportOptions) -> Result<Value, ValidationError> {
    let url = validate_url("url", target)?;
    if options.max_urls == 0 {
        return Err(ValidationError::new("max_urls", "must be at least 1"));
    }
    let max_urls = options.max_urls.min(TEXT_EXPORT_MAX_URLS);
    if max_urls < options.max_urls {
        tracing::debug!(
            "Clamping text export max_urls from {} to {}",
            options.max_urls,
            max_urls
        );
    }

    to_value(&TextExportPayload {
        url,
        max_urls,
        show_full_text: options.show_full_text,
    })
}

/// Checks that `value` parses as an absolute http(s) URL
fn validate_url<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let parsed = Url::parse(value)
        .map_err(|e| ValidationError::new(field, format!("'{}' is not a valid URL: {}", value, e)))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ValidationError::new(
            field,
            format!("'{}' must use http or https", value),
        ));
    }
    Ok(value)
}

fn check_range(
    field: &'static str,
    value: u32,
    range: RangeInclusive<u32>,
) -> Result<(), ValidationError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new(
            field,
            format!(
                "must be between {} and {}, got {}",
                range.start(),
                range.end(),
                value
            ),
        ))
    }
}

fn is_empty_list(value: &&[String]) -> bool {
    value.is_empty()
}

fn is_empty_map(value: &&BTreeMap<String, String>) -> bool {
    value.is_empty()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn non_zero(value: Option<u64>) -> Option<u64> {
    value.filter(|v| *v > 0)
}

fn to_value<T: Serialize>(payload: &T) -> Result<Value, ValidationError> {
    serde_json::to_value(payload).map_err(|e| ValidationError::new("payload", e.to_string()))
}
