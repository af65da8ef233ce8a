//! Help Document Module
//! The downloadable insights document, served byte-for-byte.

use crate::config::HelpDocumentConfig;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Mime type of a Word (.docx) document.
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Help document not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to read help document {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to save help document to {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// An in-memory copy of the help document with its download metadata.
#[derive(Debug, Clone)]
pub struct HelpDocument {
    pub label: String,
    pub file_name: String,
    pub mime: &'static str,
    bytes: Vec<u8>,
}

impl HelpDocument {
    /// Read the configured document. The file name offered for download is
    /// the source file's own name.
    pub fn load(config: &HelpDocumentConfig) -> Result<Self, DocumentError> {
        let path = &config.path;
        let bytes = fs::read(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                DocumentError::NotFound(path.clone())
            } else {
                DocumentError::Read {
                    path: path.clone(),
                    source,
                }
            }
        })?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| format!("{}.docx", config.label));

        tracing::info!(
            "Loaded help document {} ({} bytes)",
            path.display(),
            bytes.len()
        );

        Ok(Self {
            label: config.label.clone(),
            file_name,
            mime: DOCX_MIME,
            bytes,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Write the document unchanged to `dest`.
    pub fn save_to(&self, dest: &Path) -> Result<(), DocumentError> {
        fs::write(dest, &self.bytes).map_err(|source| DocumentError::Write {
            path: dest.to_path_buf(),
            source,
        })?;
        tracing::info!("Saved {} to {}", self.file_name, dest.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(path: PathBuf) -> HelpDocumentConfig {
        HelpDocumentConfig {
            path,
            label: "Superstore Sales Dashboard Insights".to_string(),
        }
    }

    #[test]
    fn test_missing_document_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = HelpDocument::load(&config_for(dir.path().join("gone.docx"))).unwrap_err();
        assert!(matches!(err, DocumentError::NotFound(_)));
    }

    #[test]
    fn test_document_served_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("Insights.docx");
        let payload: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        fs::write(&src, &payload).unwrap();

        let doc = HelpDocument::load(&config_for(src)).unwrap();
        assert_eq!(doc.bytes(), payload.as_slice());
        assert_eq!(doc.len(), 4096);
        assert_eq!(doc.file_name, "Insights.docx");
        assert_eq!(doc.mime, DOCX_MIME);

        let dest = dir.path().join("copy.docx");
        doc.save_to(&dest).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), payload);
    }

    #[test]
    fn test_save_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("Insights.docx");
        fs::write(&src, b"PK").unwrap();
        let doc = HelpDocument::load(&config_for(src)).unwrap();

        let err = doc
            .save_to(&dir.path().join("no/such/dir/copy.docx"))
            .unwrap_err();
        assert!(matches!(err, DocumentError::Write { .. }));
    }
}
