use crate::normalize::NormalizedRecord;
use crate::output::{OutputError, OutputResult};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// File name for a page: the hex SHA-256 of its URL plus `.md`
pub fn page_file_name(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    format!("{}.md", hex::encode(hasher.finalize()))
}

/// Writes each record's markdown to its own file under `dir`
///
/// Creates `dir` if needed. Records without markdown are skipped; two records
/// with the same URL share a file and the later one wins.
///
/// # Returns
///
/// * `Ok(Vec<PathBuf>)` - Paths written, in record order
/// * `Err(OutputError)` - The directory or a file could not be written
pub fn write_page_files(records: &[NormalizedRecord], dir: &Path) -> OutputResult<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(|source| OutputError::Write {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::new();
    for record in records.iter().filter(|r| !r.markdown.is_empty()) {
        let path = dir.join(page_file_name(&record.url));
        write_text(&path, &record.markdown)?;
        written.push(path);
    }

    tracing::info!("Wrote {} page files to {}", written.len(), dir.display());
    Ok(written)
}

/// Writes `content` to `path`, replacing any existing file
pub fn write_text(path: &Path, content: &str) -> OutputResult<()> {
    fs::write(path, content).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
