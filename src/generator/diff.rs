//! Diff-checking and persistence of generated files.

use crate::error::DbResult;
use std::io::ErrorKind;
use std::path::Path;

/// Number of volatile header lines (banner and timestamp) ignored by [`check_diff`].
pub const HEADER_LINES: usize = 2;

/// True if `candidate` differs from `existing` anywhere below the header.
pub fn check_diff(existing: &str, candidate: &str) -> bool {
    let existing: Vec<&str> = existing.split('\n').skip(HEADER_LINES).collect();
    let candidate: Vec<&str> = candidate.split('\n').skip(HEADER_LINES).collect();
    existing.len() != candidate.len() || existing.iter().zip(&candidate).any(|(a, b)| a != b)
}

/// Read a previous output. A missing file is `Ok(None)`.
pub async fn read_existing(path: &Path) -> DbResult<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Write `content` to `path`, creating parent directories.
pub async fn write_output(path: &Path, content: &str) -> DbResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, content).await?;
    Ok(())
}
