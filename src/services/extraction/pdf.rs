//! PDF text extraction

use super::ExtractionError;
use pdf_oxide::PdfDocument;
use std::path::Path;

/// Extract the text of every page, pages separated by a newline
pub fn extract_pdf(path: &Path) -> Result<String, ExtractionError> {
    let doc = PdfDocument::open(path)
        .map_err(|e| ExtractionError::Failed(format!("failed to parse PDF: {}", e)))?;

    let page_count = doc
        .page_count()
        .map_err(|e| ExtractionError::Failed(format!("failed to read page count: {}", e)))?;

    let mut pages = Vec::with_capacity(page_count);
    for page_index in 0..page_count {
        let text = doc.extract_text(page_index).map_err(|e| {
            ExtractionError::Failed(format!("failed to read page {}: {}", page_index + 1, e))
        })?;
        pages.push(text);
    }

    tracing::debug!(page_count, "PDF pages read");
    Ok(pages.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();

        let err = extract_pdf(&path).unwrap_err();

        assert!(matches!(err, ExtractionError::Failed(_)));
    }
}
