//! Markdown and plain-text rendering
//!
//! This module turns normalized records, map links and research reports into
//! the documents a user saves or copies.

use crate::normalize::{NormalizedRecord, ResearchReport};

/// Separator placed between pages in a combined document
const PAGE_SEPARATOR: &str = "\n\n---\n\n";

/// Concatenates every record with markdown into one document
///
/// Each page becomes `# {title}` followed by its markdown. Records without
/// markdown are left out.
///
/// # Arguments
///
/// * `records` - Normalized pages, in the order they should appear
///
/// # Returns
///
/// The combined markdown, or an empty string if no record has markdown
pub fn combined_markdown(records: &[NormalizedRecord]) -> String {
    records
        .iter()
        .filter(|r| !r.markdown.is_empty())
        .map(|r| format!("# {}\n\n{}", r.title, r.markdown))
        .collect::<Vec<_>>()
        .join(PAGE_SEPARATOR)
}

/// One link per line
pub fn links_text<S: AsRef<str>>(links: &[S]) -> String {
    links
        .iter()
        .map(|l| l.as_ref())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Formats a research report as markdown
///
/// The final analysis comes first, followed by a `## Sources` list when the
/// report cites any.
pub fn research_markdown(report: &ResearchReport) -> String {
    let mut md = String::new();

    md.push_str(report.final_analysis.trim_end());

    if !report.sources.is_empty() {
        if !md.is_empty() {
            md.push_str("\n\n");
        }
        md.push_str("## Sources\n\n");
        for source in &report.sources {
            md.push_str(&format!("- [{}]({})", source.title, source.url));
            if !source.description.is_empty() {
                md.push_str(&format!(": {}", source.description));
            }
            md.push('\n');
        }
    } else if !md.is_empty() {
        md.push('\n');
    }

    md
}
