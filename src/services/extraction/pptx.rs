//! PowerPoint (PPTX) text extraction
//!
//! Slides are read in slide-number order; each slide's text is trimmed and
//! the slides are joined with a single newline.

use super::ooxml::{collect_text, open_archive, read_part, TextMarkup};
use super::ExtractionError;
use std::path::Path;

const SLIDE_PREFIX: &str = "ppt/slides/slide";

const DRAWING_MARKUP: TextMarkup = TextMarkup {
    run: b"a:t",
    paragraph: b"a:p",
    paragraph_separator: "\n",
    tabs: &[],
    breaks: &[b"a:br"],
};

/// Slide number of a `ppt/slides/slideN.xml` entry
fn slide_number(name: &str) -> Option<u32> {
    name.strip_prefix(SLIDE_PREFIX)?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

/// Extract per-slide text from a presentation, joined by newline
pub fn extract_pptx(path: &Path) -> Result<String, ExtractionError> {
    let mut archive = open_archive(path)?;

    let mut slides: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| slide_number(name).map(|n| (n, name.to_string())))
        .collect();
    slides.sort_by_key(|(n, _)| *n);

    let mut texts = Vec::with_capacity(slides.len());
    for (_, name) in &slides {
        let xml = read_part(&mut archive, name)?;
        texts.push(collect_text(&xml, &DRAWING_MARKUP)?.trim().to_string());
    }

    tracing::debug!(slide_count = slides.len(), "Presentation slides read");
    Ok(texts.join("\n"))
}
