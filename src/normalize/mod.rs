//! Normalize module for reshaping provider results
//!
//! This module contains:
//! - Page-list normalization into `NormalizedRecord`s
//! - Extractors for map links, research reports and text exports

mod extract;
mod record;

pub use extract::{
    map_links, research_report, text_export, ResearchActivity, ResearchReport, ResearchSource,
    TextExport,
};
pub use record::{
    normalize, normalize_entries, normalize_page, MalformedRecord, NormalizedRecord, UNTITLED,
};
