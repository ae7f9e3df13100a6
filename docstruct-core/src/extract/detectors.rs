//! Detection strategies for headings and footnote citations.
//!
//! Document models differ in fidelity: some expose paragraph styles and
//! native footnote references, others only carry plain text. Each concern
//! has a metadata-aware strategy and a text-pattern strategy behind a small
//! trait, and the extractor picks the one the input can support.

use crate::types::{HeadingSymbol, ParagraphRecord};
use regex::Regex;
use std::sync::LazyLock;

static NUMBERED_HEADING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^((?:\d+\.)+)\s").unwrap());

static HEADING_STYLE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^heading\s*(\d+)").unwrap());

static FOOTNOTE_TEXT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d+)\]").unwrap());

static APPENDIX_TEXT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^appendix\s+[a-z0-9]+").unwrap());

// ============================================================================
// Headings
// ============================================================================

pub trait HeadingDetector {
    /// None for a paragraph that is not a heading under this strategy
    fn detect(&self, paragraph: &ParagraphRecord) -> Option<HeadingSymbol>;

    fn name(&self) -> &str;
}

/// "2.1. Scope" style numbered headings; level is the number of dot groups
pub struct NumberedHeadingDetector;

impl HeadingDetector for NumberedHeadingDetector {
    fn detect(&self, paragraph: &ParagraphRecord) -> Option<HeadingSymbol> {
        let text = paragraph.text.trim_start();
        let captures = NUMBERED_HEADING_REGEX.captures(text)?;
        let prefix = captures.get(1)?;

        let number_path: Vec<u32> = prefix
            .as_str()
            .split('.')
            .filter(|part| !part.is_empty())
            .map(|part| part.parse::<u32>().ok())
            .collect::<Option<_>>()?;

        Some(HeadingSymbol {
            level: number_path.len(),
            number_path,
            normalized_text: text[prefix.end()..].trim().to_string(),
            source_index: paragraph.index,
        })
    }

    fn name(&self) -> &str {
        "NumberedHeading"
    }
}

/// Paragraphs styled "Heading N"; no number path
pub struct StyleHeadingDetector;

impl HeadingDetector for StyleHeadingDetector {
    fn detect(&self, paragraph: &ParagraphRecord) -> Option<HeadingSymbol> {
        let style = paragraph.style_name.as_deref()?;
        let level = heading_style_level(style)?;
        let text = paragraph.text.trim();
        if text.is_empty() {
            return None;
        }

        Some(HeadingSymbol {
            level,
            number_path: Vec::new(),
            normalized_text: text.to_string(),
            source_index: paragraph.index,
        })
    }

    fn name(&self) -> &str {
        "StyleHeading"
    }
}

/// Level encoded in a "Heading N" style name
pub fn heading_style_level(style: &str) -> Option<usize> {
    let captures = HEADING_STYLE_REGEX.captures(style.trim())?;
    let level = captures.get(1)?.as_str().parse::<usize>().ok()?;
    (level > 0).then_some(level)
}

/// Appendix headings open a new footnote numbering scope
pub fn is_appendix_heading(paragraph: &ParagraphRecord) -> bool {
    let text = paragraph.text.trim();
    let styled_heading = paragraph
        .style_name
        .as_deref()
        .map(|style| style.trim().to_lowercase().starts_with("heading"))
        .unwrap_or(false);

    (styled_heading && text.to_lowercase().contains("appendix"))
        || APPENDIX_TEXT_REGEX.is_match(text)
}

/// Comparison key for heading names: case-folded, single-spaced, trailing periods dropped
pub fn heading_key(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches('.')
        .to_lowercase()
}

// ============================================================================
// Footnotes
// ============================================================================

pub trait FootnoteScanner {
    /// Footnote numbers cited by one paragraph, in reading order
    fn scan(&self, paragraph: &ParagraphRecord) -> Vec<u32>;

    fn name(&self) -> &str;
}

/// Reads native footnote-reference ids from runs
pub struct NativeFootnoteScanner;

impl FootnoteScanner for NativeFootnoteScanner {
    fn scan(&self, paragraph: &ParagraphRecord) -> Vec<u32> {
        paragraph
            .runs
            .iter()
            .filter_map(|run| run.footnote_id)
            .collect()
    }

    fn name(&self) -> &str {
        "NativeFootnotes"
    }
}

/// Falls back to bracketed "[n]" markers in the text
pub struct TextualFootnoteScanner;

impl FootnoteScanner for TextualFootnoteScanner {
    fn scan(&self, paragraph: &ParagraphRecord) -> Vec<u32> {
        FOOTNOTE_TEXT_REGEX
            .captures_iter(&paragraph.text)
            .filter_map(|captures| captures.get(1)?.as_str().parse::<u32>().ok())
            .collect()
    }

    fn name(&self) -> &str {
        "TextualFootnotes"
    }
}

/// Native ids win as soon as the document model supplies any
pub fn select_footnote_scanner(paragraphs: &[ParagraphRecord]) -> Box<dyn FootnoteScanner> {
    let has_native = paragraphs
        .iter()
        .flat_map(|p| p.runs.iter())
        .any(|run| run.footnote_id.is_some());

    if has_native {
        Box::new(NativeFootnoteScanner)
    } else {
        Box::new(TextualFootnoteScanner)
    }
}
