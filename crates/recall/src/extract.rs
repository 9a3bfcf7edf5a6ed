//! Text extraction for uploaded documents.
//!
//! PDFs are extracted with `pdf-extract`; `.txt` and `.md` files are read
//! directly. Extraction failures are fatal to the upload and surface as
//! [`ExtractError`] — a missing file and an unparseable file are distinct
//! failure classes so the caller can report them differently.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

use recall_core::chunk::short_hash;

/// Extraction error. No panic; the upload is rejected and reported.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("file not found: {0}")]
    NotFound(PathBuf),
    #[error("invalid document format: {0}")]
    InvalidFormat(String),
}

/// Extract plain text from a document on disk.
///
/// Supported formats: `.pdf`, `.txt`, `.md`. A PDF that parses but yields
/// no text (e.g. a scanned image PDF) is not an error — it logs a warning
/// and indexes to zero chunks downstream.
pub fn extract_text(path: &Path) -> Result<String, ExtractError> {
    if !path.exists() {
        return Err(ExtractError::NotFound(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => {
            let text = pdf_extract::extract_text(path)
                .map_err(|e| ExtractError::InvalidFormat(e.to_string()))?;
            if text.trim().is_empty() {
                warn!(path = %path.display(), "PDF contains no extractable text");
            }
            Ok(text)
        }
        "txt" | "md" => std::fs::read_to_string(path)
            .map_err(|e| ExtractError::InvalidFormat(e.to_string())),
        other => Err(ExtractError::InvalidFormat(format!(
            "unsupported extension: .{} ({})",
            other,
            path.display()
        ))),
    }
}

/// Stable document id derived from the source name.
///
/// Re-uploading a file with the same name maps to the same document id, so
/// the ingest flow can replace its previous chunks instead of duplicating
/// them.
pub fn document_id_for_source(source: &str) -> String {
    short_hash(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_not_found() {
        let err = extract_text(Path::new("/nonexistent/file.pdf")).unwrap_err();
        assert!(matches!(err, ExtractError::NotFound(_)));
    }

    #[test]
    fn test_unsupported_extension_is_invalid_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archive.zip");
        std::fs::write(&path, b"not a document").unwrap();

        let err = extract_text(&path).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidFormat(_)));
        assert!(err.to_string().contains("unsupported extension"));
    }

    #[test]
    fn test_plain_text_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "Plain text content.").unwrap();

        assert_eq!(extract_text(&path).unwrap(), "Plain text content.");
    }

    #[test]
    fn test_garbage_pdf_is_invalid_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"definitely not a pdf").unwrap();

        let err = extract_text(&path).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidFormat(_)));
    }

    #[test]
    fn test_document_id_is_deterministic() {
        let a = document_id_for_source("report.pdf");
        let b = document_id_for_source("report.pdf");
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert_ne!(a, document_id_for_source("other.pdf"));
    }
}
