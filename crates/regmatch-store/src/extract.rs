//! Source-document text extraction.
//!
//! Only plain-text sources are read here. Binary formats (PDF, DOCX) are
//! converted to text upstream and rejected with
//! [`StoreError::UnsupportedFormat`].

use std::fs;
use std::path::Path;

use tracing::info;

use crate::StoreError;

const TEXT_EXTENSIONS: &[&str] = &["txt", "text"];

/// Read the raw text of a regulation source document.
pub fn extract_text(path: &Path) -> Result<String, StoreError> {
    if !path.exists() {
        return Err(StoreError::NotFound(path.to_path_buf()));
    }

    let supported = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| TEXT_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
    if !supported {
        return Err(StoreError::UnsupportedFormat(path.to_path_buf()));
    }

    let text = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    info!(path = %path.display(), chars = text.chars().count(), "extracted source text");
    Ok(text)
}
