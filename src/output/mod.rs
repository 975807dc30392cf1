//! Output module for rendering and saving job results
//!
//! This module handles:
//! - Rendering records, link lists and research reports as markdown/text
//! - Writing one markdown file per page
//! - Writing rendered text to disk

mod files;
mod markdown;

pub use files::{page_file_name, write_page_files, write_text};
pub use markdown::{combined_markdown, links_text, research_markdown};

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while writing output
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
