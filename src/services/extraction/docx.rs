//! Word (DOCX) raw text extraction

use super::ooxml::{collect_text, open_archive, read_part, TextMarkup};
use super::ExtractionError;
use std::path::Path;

const DOCUMENT_PART: &str = "word/document.xml";

const WORD_MARKUP: TextMarkup = TextMarkup {
    run: b"w:t",
    paragraph: b"w:p",
    paragraph_separator: "\n\n",
    tabs: &[b"w:tab"],
    breaks: &[b"w:br", b"w:cr"],
};

/// Extract the raw text of a Word document, one blank line between paragraphs
pub fn extract_docx(path: &Path) -> Result<String, ExtractionError> {
    let mut archive = open_archive(path)?;
    let xml = read_part(&mut archive, DOCUMENT_PART)?;
    let text = collect_text(&xml, &WORD_MARKUP)?;
    Ok(text.trim_end().to_string())
}
