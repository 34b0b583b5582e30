//! Document text extraction
//!
//! Uploaded files are staged to a temporary file, handed to the extractor
//! matching their declared media type, and removed again once extraction
//! finishes, whether it succeeded or not. Media types are matched exactly;
//! anything unrecognised is rejected before any extractor runs.

mod docx;
mod ooxml;
mod pdf;
mod pptx;

pub use docx::extract_docx;
pub use pdf::extract_pdf;
pub use pptx::extract_pptx;

use async_trait::async_trait;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use thiserror::Error;

// ============================================================================
// Document Kinds
// ============================================================================

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const PPTX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// Supported upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Pptx,
}

impl DocumentKind {
    /// Exact media-type lookup
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            PDF_MIME => Some(Self::Pdf),
            DOCX_MIME => Some(Self::Docx),
            PPTX_MIME => Some(Self::Pptx),
            _ => None,
        }
    }

    pub fn as_mime(&self) -> &'static str {
        match self {
            Self::Pdf => PDF_MIME,
            Self::Docx => DOCX_MIME,
            Self::Pptx => PPTX_MIME,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf => write!(f, "pdf"),
            Self::Docx => write!(f, "docx"),
            Self::Pptx => write!(f, "pptx"),
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("unsupported content type: {0}")]
    UnsupportedFormat(String),

    #[error("extraction failed: {0}")]
    Failed(String),

    #[error("upload staging failed: {0}")]
    Staging(#[from] std::io::Error),
}

// ============================================================================
// Extractor Port
// ============================================================================

/// Converts a staged document on disk into plain text
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract(&self, kind: DocumentKind, path: &Path) -> Result<String, ExtractionError>;
}

/// Default extractor backed by the PDF and Office Open XML readers
#[derive(Debug, Default, Clone, Copy)]
pub struct OfficeExtractor;

impl OfficeExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentExtractor for OfficeExtractor {
    #[tracing::instrument(skip_all, fields(kind = %kind))]
    async fn extract(&self, kind: DocumentKind, path: &Path) -> Result<String, ExtractionError> {
        let path = path.to_path_buf();
        let text = tokio::task::spawn_blocking(move || match kind {
            DocumentKind::Pdf => extract_pdf(&path),
            DocumentKind::Docx => extract_docx(&path),
            DocumentKind::Pptx => extract_pptx(&path),
        })
        .await
        .map_err(|e| ExtractionError::Failed(format!("task join error: {}", e)))??;

        tracing::info!(chars = text.len(), "Document text extraction complete");
        Ok(text)
    }
}

// ============================================================================
// Extraction Service
// ============================================================================

/// Stages uploads on disk and dispatches them to an extractor
pub struct ExtractionService {
    extractor: Arc<dyn DocumentExtractor>,
    upload_dir: PathBuf,
}

impl ExtractionService {
    pub fn new(extractor: Arc<dyn DocumentExtractor>, upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            extractor,
            upload_dir: upload_dir.into(),
        }
    }

    /// Extract text from an uploaded file declared as `content_type`
    ///
    /// The staged copy is deleted before this returns.
    pub async fn extract_upload(
        &self,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<String, ExtractionError> {
        let kind = DocumentKind::from_mime(content_type)
            .ok_or_else(|| ExtractionError::UnsupportedFormat(content_type.to_string()))?;

        let upload_dir = self.upload_dir.clone();
        let staged = tokio::task::spawn_blocking(move || stage_upload(&upload_dir, &data))
            .await
            .map_err(|e| ExtractionError::Failed(format!("task join error: {}", e)))??;

        tracing::debug!(kind = %kind, path = %staged.path().display(), "Upload staged");

        let result = self.extractor.extract(kind, staged.path()).await;

        if let Err(e) = staged.close() {
            tracing::warn!(error = %e, "Failed to remove staged upload");
        }

        result
    }
}

/// Write `data` to a fresh temporary file under `dir`
fn stage_upload(dir: &Path, data: &[u8]) -> Result<NamedTempFile, ExtractionError> {
    let mut file = tempfile::Builder::new()
        .prefix("upload-")
        .tempfile_in(dir)?;
    file.write_all(data)?;
    file.flush()?;
    Ok(file)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records the staged path and whether it existed during extraction
    struct RecordingExtractor {
        seen: Mutex<Vec<(DocumentKind, PathBuf, bool)>>,
        fail: bool,
    }

    impl RecordingExtractor {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                seen: Mutex::new(Vec::new()),
                fail,
            })
        }
    }

    #[async_trait]
    impl DocumentExtractor for RecordingExtractor {
        async fn extract(
            &self,
            kind: DocumentKind,
            path: &Path,
        ) -> Result<String, ExtractionError> {
            self.seen
                .lock()
                .unwrap()
                .push((kind, path.to_path_buf(), path.exists()));
            if self.fail {
                return Err(ExtractionError::Failed("parser exploded".to_string()));
            }
            Ok(std::fs::read_to_string(path)?)
        }
    }

    fn dir_is_empty(dir: &Path) -> bool {
        std::fs::read_dir(dir).unwrap().next().is_none()
    }

    #[test]
    fn test_mime_lookup_is_exact() {
        assert_eq!(DocumentKind::from_mime(PDF_MIME), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_mime(DOCX_MIME), Some(DocumentKind::Docx));
        assert_eq!(DocumentKind::from_mime(PPTX_MIME), Some(DocumentKind::Pptx));
        assert_eq!(DocumentKind::from_mime("application/PDF"), None);
        assert_eq!(DocumentKind::from_mime("application/pdf; charset=binary"), None);
        assert_eq!(DocumentKind::from_mime("text/plain"), None);
        assert_eq!(DocumentKind::Docx.as_mime(), DOCX_MIME);
    }

    #[tokio::test]
    async fn test_staged_file_removed_after_success() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = RecordingExtractor::new(false);
        let service = ExtractionService::new(extractor.clone(), dir.path());

        let text = service
            .extract_upload(PDF_MIME, b"page text".to_vec())
            .await
            .unwrap();

        assert_eq!(text, "page text");
        let seen = extractor.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, DocumentKind::Pdf);
        assert!(seen[0].2, "file should exist while extracting");
        assert!(!seen[0].1.exists());
        assert!(dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn test_staged_file_removed_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = RecordingExtractor::new(true);
        let service = ExtractionService::new(extractor.clone(), dir.path());

        let err = service
            .extract_upload(DOCX_MIME, b"junk".to_vec())
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractionError::Failed(_)));
        assert_eq!(extractor.seen.lock().unwrap().len(), 1);
        assert!(dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn test_unsupported_type_skips_extractor() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = RecordingExtractor::new(false);
        let service = ExtractionService::new(extractor.clone(), dir.path());

        let err = service
            .extract_upload("image/png", vec![0x89, 0x50])
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractionError::UnsupportedFormat(ref t) if t == "image/png"));
        assert!(extractor.seen.lock().unwrap().is_empty());
        assert!(dir_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn test_office_extractor_reports_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        let service = ExtractionService::new(Arc::new(OfficeExtractor::new()), dir.path());

        let err = service
            .extract_upload(PPTX_MIME, b"definitely not a zip".to_vec())
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractionError::Failed(_)));
        assert!(dir_is_empty(dir.path()));
    }
}
