//! Markdown stripping for generated text
//!
//! Gemini answers in markdown; the study UI renders plain text. This module
//! turns model output into plain text with an ordered list of small regex
//! rules. Each rule is a pure `&str -> String` pass and later rules see the
//! output of earlier ones, so the order in [`FULL_PIPELINE`] matters:
//!
//! 1. Emphasis (`*`, `**`, `***`, then `_`, `__`, `___`)
//! 2. Heading markers
//! 3. Fenced code blocks (removed with their content)
//! 4. Inline code spans
//! 5. Unordered list markers
//! 6. Ordered list markers
//! 7. Horizontal rules
//! 8. Blockquote markers
//! 9. Images (before links, so `![alt](url)` never leaves a stray `!`)
//! 10. Links
//! 11. Blank-line runs
//! 12. Per-line and whole-text trimming
//!
//! Sanitization never fails. Malformed markdown such as an unterminated code
//! fence is left as-is.
//!
//! Each prefix rule strips one marker per line, so stacked markers
//! (`> > quote`, `1. 2. item`) lose one level per pass and a second pass
//! still changes them.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Rule Pipeline
// ============================================================================

/// A single named text transformation
#[derive(Clone, Copy)]
pub struct SanitizeRule {
    /// Short identifier, used in logs and tests
    pub name: &'static str,
    apply: fn(&str) -> String,
}

impl SanitizeRule {
    /// Run this rule on `input`
    pub fn apply(&self, input: &str) -> String {
        (self.apply)(input)
    }
}

impl fmt::Debug for SanitizeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SanitizeRule").field("name", &self.name).finish()
    }
}

/// The reference pipeline, in application order
pub static FULL_PIPELINE: &[SanitizeRule] = &[
    SanitizeRule { name: "emphasis", apply: strip_emphasis },
    SanitizeRule { name: "headings", apply: strip_headings },
    SanitizeRule { name: "code_fences", apply: strip_code_fences },
    SanitizeRule { name: "inline_code", apply: strip_inline_code },
    SanitizeRule { name: "unordered_lists", apply: strip_unordered_list_markers },
    SanitizeRule { name: "ordered_lists", apply: strip_ordered_list_markers },
    SanitizeRule { name: "horizontal_rules", apply: strip_horizontal_rules },
    SanitizeRule { name: "blockquotes", apply: strip_blockquotes },
    SanitizeRule { name: "images", apply: strip_images },
    SanitizeRule { name: "links", apply: strip_links },
    SanitizeRule { name: "blank_lines", apply: collapse_blank_lines },
    SanitizeRule { name: "trim", apply: trim_lines },
];

/// Strip markdown syntax from generated text using the full pipeline
pub fn sanitize(raw: &str) -> String {
    FULL_PIPELINE
        .iter()
        .fold(raw.to_string(), |text, rule| rule.apply(&text))
}

/// Legacy subset: drop `***`, `**` and `##` sequences, then trim
pub fn sanitize_minimal(raw: &str) -> String {
    raw.replace("***", "")
        .replace("**", "")
        .replace("##", "")
        .trim()
        .to_string()
}

// ============================================================================
// Sanitizer Mode
// ============================================================================

/// Which sanitization pipeline the generation handler applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SanitizerMode {
    /// Full rule pipeline (default)
    #[default]
    Full,
    /// Legacy emphasis/heading-only subset
    Minimal,
}

impl SanitizerMode {
    /// Sanitize `raw` according to this mode
    pub fn apply(&self, raw: &str) -> String {
        match self {
            Self::Full => sanitize(raw),
            Self::Minimal => sanitize_minimal(raw),
        }
    }
}

impl std::str::FromStr for SanitizerMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "minimal" | "legacy" => Ok(Self::Minimal),
            _ => anyhow::bail!("Invalid sanitizer mode: {}. Expected: full or minimal", s),
        }
    }
}

impl fmt::Display for SanitizerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Minimal => write!(f, "minimal"),
        }
    }
}

// ============================================================================
// Rules
// ============================================================================

static RE_ASTERISK_EMPHASIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*{1,3}(.*?)\*{1,3}").unwrap());
static RE_UNDERSCORE_EMPHASIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"_{1,3}(.*?)_{1,3}").unwrap());
static RE_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#+\s*(.*)$").unwrap());
static RE_CODE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```.*?```").unwrap());
static RE_INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+?)`").unwrap());
static RE_UNORDERED_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*[-*+]\s").unwrap());
static RE_ORDERED_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*\d+\.\s").unwrap());
static RE_HORIZONTAL_RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*[-*_]{3,}\s*$").unwrap());
static RE_BLOCKQUOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*>\s").unwrap());
static RE_IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[(.*?)\]\(.*?\)").unwrap());
static RE_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(.*?)\]\(.*?\)").unwrap());
static RE_BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

fn strip_emphasis(input: &str) -> String {
    let s = RE_ASTERISK_EMPHASIS.replace_all(input, "${1}");
    RE_UNDERSCORE_EMPHASIS.replace_all(&s, "${1}").into_owned()
}

fn strip_headings(input: &str) -> String {
    RE_HEADING.replace_all(input, "${1}").into_owned()
}

fn strip_code_fences(input: &str) -> String {
    RE_CODE_FENCE.replace_all(input, "").into_owned()
}

fn strip_inline_code(input: &str) -> String {
    RE_INLINE_CODE.replace_all(input, "${1}").into_owned()
}

fn strip_unordered_list_markers(input: &str) -> String {
    RE_UNORDERED_ITEM.replace_all(input, "").into_owned()
}

fn strip_ordered_list_markers(input: &str) -> String {
    RE_ORDERED_ITEM.replace_all(input, "").into_owned()
}

fn strip_horizontal_rules(input: &str) -> String {
    RE_HORIZONTAL_RULE.replace_all(input, "").into_owned()
}

fn strip_blockquotes(input: &str) -> String {
    RE_BLOCKQUOTE.replace_all(input, "").into_owned()
}

fn strip_images(input: &str) -> String {
    RE_IMAGE.replace_all(input, "${1}").into_owned()
}

fn strip_links(input: &str) -> String {
    RE_LINK.replace_all(input, "${1}").into_owned()
}

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_RUN.replace_all(input, "\n").into_owned()
}

fn trim_lines(input: &str) -> String {
    input
        .split('\n')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

// ============================================================================
// Tests
// ============================================================================
