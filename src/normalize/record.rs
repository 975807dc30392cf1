//! Canonical page records and page-shape decoding
//!
//! Provider payloads deliver pages in several shapes. Each entry is first
//! classified into a [`PageShape`], then the recognized shapes are read into a
//! [`NormalizedRecord`]. Entries that cannot be read are skipped one at a
//! time; they never fail the rest of the batch.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Title used when neither the page nor its metadata carries one
pub const UNTITLED: &str = "untitled";

/// Top-level keys that mark an object as a page
const PAGE_KEYS: &[&str] = &[
    "url",
    "title",
    "markdown",
    "html",
    "metadata",
    "description",
    "sourceURL",
];

/// One page of results in a uniform shape
///
/// Missing text fields are empty strings and missing metadata is an empty
/// map; nothing downstream ever sees `null`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct NormalizedRecord {
    pub url: String,
    pub title: String,
    pub markdown: String,
    pub html: String,
    pub metadata: Map<String, Value>,
}

/// A single entry that could not be normalized
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("entry {index} skipped: {reason}")]
pub struct MalformedRecord {
    pub index: usize,
    pub reason: String,
}

/// How a payload entry presents its page
#[derive(Debug)]
enum PageShape<'a> {
    /// Page fields nested under a `content` object
    Wrapped(&'a Map<String, Value>),
    /// Page fields at the top level
    Flat(&'a Map<String, Value>),
    /// A JSON document carried as a string
    Encoded(&'a str),
    Unrecognized(&'static str),
}

impl<'a> PageShape<'a> {
    fn classify(entry: &'a Value) -> Self {
        match entry {
            Value::String(s) => Self::Encoded(s),
            Value::Object(map) => match map.get("content") {
                Some(Value::Object(content))
                    if PAGE_KEYS.iter().any(|k| content.contains_key(*k)) =>
                {
                    Self::Wrapped(content)
                }
                Some(Value::Object(_)) => Self::Unrecognized("no page fields in `content`"),
                Some(_) => Self::Unrecognized("`content` is not an object"),
                None if PAGE_KEYS.iter().any(|k| map.contains_key(*k)) => Self::Flat(map),
                None => Self::Unrecognized("no page fields"),
            },
            Value::Null => Self::Unrecognized("null entry"),
            Value::Array(_) => Self::Unrecognized("nested list"),
            Value::Bool(_) | Value::Number(_) => Self::Unrecognized("not a page object"),
        }
    }
}

/// Normalizes every page in a terminal payload
///
/// Accepts a list of entries or an object holding the list under `data`.
/// Malformed entries are logged and left out.
pub fn normalize(payload: &Value) -> Vec<NormalizedRecord> {
    let (records, skipped) = normalize_entries(payload);
    for malformed in &skipped {
        tracing::warn!("{}", malformed);
    }
    if !skipped.is_empty() {
        tracing::info!(
            "Normalized {} records ({} entries skipped)",
            records.len(),
            skipped.len()
        );
    }
    records
}

/// Like [`normalize`], but hands back the skipped entries as well
pub fn normalize_entries(payload: &Value) -> (Vec<NormalizedRecord>, Vec<MalformedRecord>) {
    let mut records = Vec::new();
    let mut skipped = Vec::new();

    for (index, entry) in page_entries(payload).into_iter().enumerate() {
        match normalize_entry(entry) {
            Ok(record) => records.push(record),
            Err(reason) => skipped.push(MalformedRecord { index, reason }),
        }
    }

    (records, skipped)
}

/// Normalizes a single-page payload such as a one-shot scrape result
///
/// `fallback_url` is used when the page reports no URL of its own.
pub fn normalize_page(payload: &Value, fallback_url: &str) -> Result<NormalizedRecord, MalformedRecord> {
    let page = match payload.get("data") {
        Some(data) if !data.is_null() => data,
        _ => payload,
    };

    let mut record =
        normalize_entry(page).map_err(|reason| MalformedRecord { index: 0, reason })?;
    if record.url.is_empty() {
        record.url = fallback_url.to_string();
    }
    Ok(record)
}

fn page_entries(payload: &Value) -> Vec<&Value> {
    match payload {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => match map.get("data") {
            Some(Value::Array(items)) => items.iter().collect(),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn normalize_entry(entry: &Value) -> Result<NormalizedRecord, String> {
    match PageShape::classify(entry) {
        PageShape::Wrapped(page) | PageShape::Flat(page) => read_page(page),
        PageShape::Encoded(text) => {
            let decoded: Value = serde_json::from_str(text)
                .map_err(|e| format!("undecodable string entry ({})", e))?;
            // One decode pass only; a string inside a string stays malformed.
            match PageShape::classify(&decoded) {
                PageShape::Wrapped(page) | PageShape::Flat(page) => read_page(page),
                PageShape::Encoded(_) => Err("doubly encoded entry".to_string()),
                PageShape::Unrecognized(reason) => Err(reason.to_string()),
            }
        }
        PageShape::Unrecognized(reason) => Err(reason.to_string()),
    }
}

fn read_page(page: &Map<String, Value>) -> Result<NormalizedRecord, String> {
    let markdown = text_field(page, "markdown")?;
    let html = text_field(page, "html")?;
    let mut metadata = match page.get("metadata") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(_) => return Err("`metadata` is not an object".to_string()),
    };

    let url = first_text(&[
        page.get("url"),
        page.get("sourceURL"),
        metadata.get("sourceURL"),
        metadata.get("url"),
    ])
    .unwrap_or_default();

    let title = first_text(&[page.get("title"), metadata.get("title")])
        .unwrap_or_else(|| UNTITLED.to_string());

    if let Some(description) = page.get("description").and_then(Value::as_str) {
        metadata
            .entry("description")
            .or_insert_with(|| Value::String(description.to_string()));
    }

    Ok(NormalizedRecord {
        url,
        title,
        markdown,
        html,
        metadata,
    })
}

fn text_field(page: &Map<String, Value>, key: &str) -> Result<String, String> {
    match page.get(key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(format!("`{}` is not a string", key)),
    }
}

/// First candidate that is a non-blank string
fn first_text(candidates: &[Option<&Value>]) -> Option<String> {
    candidates
        .iter()
        .flatten()
        .filter_map(|v| v.as_str())
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}
