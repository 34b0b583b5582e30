//! Shared Office Open XML helpers
//!
//! DOCX and PPTX files are zip archives of XML parts. Text lives in run
//! elements (`w:t` for Word, `a:t` for DrawingML) grouped into paragraphs.

use super::ExtractionError;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

/// Element names that carry text in a given XML dialect
pub(super) struct TextMarkup {
    /// Text run element, e.g. `w:t`
    pub run: &'static [u8],
    /// Paragraph element, e.g. `w:p`
    pub paragraph: &'static [u8],
    /// Emitted after every closed paragraph
    pub paragraph_separator: &'static str,
    /// Empty elements rendered as a tab
    pub tabs: &'static [&'static [u8]],
    /// Empty elements rendered as a line break
    pub breaks: &'static [&'static [u8]],
}

pub(super) fn open_archive(path: &Path) -> Result<ZipArchive<File>, ExtractionError> {
    let file = File::open(path)?;
    ZipArchive::new(file)
        .map_err(|e| ExtractionError::Failed(format!("failed to open archive: {}", e)))
}

/// Upper bound on the buffer reserved from a part's declared size
const MAX_PREALLOC_BYTES: usize = 1024 * 1024;

/// Reservation for a part whose header claims `declared` uncompressed bytes
fn initial_capacity(declared: u64) -> usize {
    usize::try_from(declared)
        .unwrap_or(usize::MAX)
        .min(MAX_PREALLOC_BYTES)
}

pub(super) fn read_part(
    archive: &mut ZipArchive<File>,
    name: &str,
) -> Result<String, ExtractionError> {
    let mut entry = archive
        .by_name(name)
        .map_err(|e| ExtractionError::Failed(format!("missing part {}: {}", name, e)))?;
    let mut xml = String::with_capacity(initial_capacity(entry.size()));
    entry.read_to_string(&mut xml)?;
    Ok(xml)
}

/// Collect the text runs of an XML part, separating paragraphs
pub(super) fn collect_text(xml: &str, markup: &TextMarkup) -> Result<String, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == markup.run => in_run = true,
            Ok(Event::End(e)) => {
                let name = e.name();
                if name.as_ref() == markup.run {
                    in_run = false;
                } else if name.as_ref() == markup.paragraph {
                    out.push_str(markup.paragraph_separator);
                }
            }
            Ok(Event::Empty(e)) => {
                let name = e.name();
                if markup.tabs.contains(&name.as_ref()) {
                    out.push('\t');
                } else if markup.breaks.contains(&name.as_ref()) {
                    out.push('\n');
                }
            }
            Ok(Event::Text(t)) if in_run => {
                let text = t
                    .unescape()
                    .map_err(|e| ExtractionError::Failed(format!("bad XML text: {}", e)))?;
                out.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractionError::Failed(format!(
                    "XML error at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    Ok(out)
}
