//! Extractors for payloads that are not page lists

use serde::Serialize;
use serde_json::Value;

/// One source consulted by a deep research job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResearchSource {
    pub url: String,
    pub title: String,
    pub description: String,
}

/// One step a deep research job reported while running
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResearchActivity {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

/// Final output of a deep research job
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ResearchReport {
    pub final_analysis: String,
    pub sources: Vec<ResearchSource>,
    pub activities: Vec<ResearchActivity>,
}

/// Result of an llms.txt text export
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TextExport {
    pub llmstxt: String,
    /// Present only when the full text was requested and produced
    pub llms_full_txt: Option<String>,
}

/// The job's `data` object when the payload is a full response body
fn unwrap_data(payload: &Value) -> &Value {
    match payload.get("data") {
        Some(data) if !data.is_null() => data,
        _ => payload,
    }
}

fn string_at(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Links discovered by a map request
///
/// Entries may be plain strings or objects with a `url`; anything else is
/// dropped.
pub fn map_links(payload: &Value) -> Vec<String> {
    let data = unwrap_data(payload);
    let links = payload
        .get("links")
        .or_else(|| data.get("links"))
        .unwrap_or(data);

    let Value::Array(items) = links else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(url) => Some(url.clone()),
            Value::Object(_) => string_at(item, "url"),
            _ => None,
        })
        .filter(|url| !url.trim().is_empty())
        .collect()
}

pub fn research_report(payload: &Value) -> ResearchReport {
    let data = unwrap_data(payload);

    let sources = data
        .get("sources")
        .and_then(Value::as_array)
        .map(|sources| {
            sources
                .iter()
                .filter(|s| s.is_object())
                .map(|s| ResearchSource {
                    url: string_at(s, "url").unwrap_or_default(),
                    title: string_at(s, "title").unwrap_or_else(|| super::UNTITLED.to_string()),
                    description: string_at(s, "description").unwrap_or_default(),
                })
                .collect()
        })
        .unwrap_or_default();

    let activities = data
        .get("activities")
        .and_then(Value::as_array)
        .map(|activities| {
            activities
                .iter()
                .filter(|a| a.is_object())
                .map(|a| ResearchActivity {
                    kind: string_at(a, "type").unwrap_or_else(|| "unknown".to_string()),
                    message: string_at(a, "message").unwrap_or_default(),
                })
                .collect()
        })
        .unwrap_or_default();

    ResearchReport {
        final_analysis: string_at(data, "finalAnalysis").unwrap_or_default(),
        sources,
        activities,
    }
}

pub fn text_export(payload: &Value) -> TextExport {
    let data = unwrap_data(payload);
    TextExport {
        llmstxt: string_at(data, "llmstxt").unwrap_or_default(),
        llms_full_txt: string_at(data, "llmsfulltxt").filter(|t| !t.is_empty()),
    }
}
