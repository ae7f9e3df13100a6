use super::symbols::is_caption_paragraph;
use crate::types::*;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

static SECTION_REFERENCE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:paragraph|section|subsection)s?\s+(\d+(?:\.\d+)*)").unwrap()
});

static CAPTION_REFERENCE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(table|figure)s?\s+(\d+(?:[-.]\d+)?)\b").unwrap()
});

static APPENDIX_REFERENCE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?i:appendix)\s+([A-Z])\b").unwrap());

static ACRONYM_TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z]{2,}\b").unwrap());

/// Single pass collecting every prose occurrence that must resolve to a symbol.
///
/// Occurrences borrow their paragraph text; the tables live as long as the
/// paragraph slice.
pub struct ReferenceExtractor;

impl ReferenceExtractor {
    pub fn extract<'a>(
        &self,
        paragraphs: &'a [ParagraphRecord],
        symbols: &SymbolTables,
    ) -> ReferenceTables<'a> {
        let heading_indices: HashSet<usize> =
            symbols.headings.iter().map(|h| h.source_index).collect();

        let mut tables = ReferenceTables::default();
        let mut headings = symbols.headings.iter().peekable();
        let mut enclosing_section: Option<String> = None;

        for paragraph in paragraphs {
            while let Some(heading) = headings.next_if(|h| h.source_index <= paragraph.index) {
                if let Some(id) = heading.section_id() {
                    enclosing_section = Some(id);
                }
            }

            let text = paragraph.text.as_str();
            let is_heading = heading_indices.contains(&paragraph.index);

            if !is_heading {
                collect_section_references(paragraph, &enclosing_section, &mut tables);
                collect_appendix_references(paragraph, &mut tables);
            }
            if !is_caption_paragraph(text) {
                collect_caption_references(paragraph, &enclosing_section, &mut tables);
            }
            collect_acronym_usages(paragraph, &mut tables);
        }

        // Per-paragraph collection runs kind by kind; restore reading order
        tables
            .cross_references
            .sort_by_key(|r| (r.source_index, r.offset));

        debug!(
            "Extracted {} cross-references and {} acronym usages",
            tables.cross_references.len(),
            tables.acronym_usages.len()
        );

        tables
    }
}

fn collect_section_references<'a>(
    paragraph: &'a ParagraphRecord,
    enclosing_section: &Option<String>,
    tables: &mut ReferenceTables<'a>,
) {
    for captures in SECTION_REFERENCE_REGEX.captures_iter(&paragraph.text) {
        let Some(id) = captures.get(1) else { continue };
        tables.cross_references.push(ReferenceOccurrence {
            kind: ReferenceKind::Section,
            target: id.as_str().to_string(),
            source_index: paragraph.index,
            raw_text: &paragraph.text,
            offset: id.start(),
            enclosing_section: enclosing_section.clone(),
        });
    }
}

fn collect_caption_references<'a>(
    paragraph: &'a ParagraphRecord,
    enclosing_section: &Option<String>,
    tables: &mut ReferenceTables<'a>,
) {
    for captures in CAPTION_REFERENCE_REGEX.captures_iter(&paragraph.text) {
        let (Some(word), Some(id)) = (captures.get(1), captures.get(2)) else {
            continue;
        };
        let kind = if word.as_str().eq_ignore_ascii_case("table") {
            ReferenceKind::Table
        } else {
            ReferenceKind::Figure
        };
        tables.cross_references.push(ReferenceOccurrence {
            kind,
            target: id.as_str().to_string(),
            source_index: paragraph.index,
            raw_text: &paragraph.text,
            offset: id.start(),
            enclosing_section: enclosing_section.clone(),
        });
    }
}

fn collect_appendix_references<'a>(paragraph: &'a ParagraphRecord, tables: &mut ReferenceTables<'a>) {
    let text = paragraph.text.as_str();
    for captures in APPENDIX_REFERENCE_REGEX.captures_iter(text) {
        let Some(letter) = captures.get(1) else { continue };
        // "Appendix A. Forms" at the start of a paragraph declares the appendix
        if captures.get(0).map(|m| text[..m.start()].trim().is_empty()).unwrap_or(false) {
            continue;
        }
        tables.cross_references.push(ReferenceOccurrence {
            kind: ReferenceKind::Appendix,
            target: letter.as_str().to_string(),
            source_index: paragraph.index,
            raw_text: text,
            offset: letter.start(),
            enclosing_section: None,
        });
    }
}

fn collect_acronym_usages<'a>(paragraph: &'a ParagraphRecord, tables: &mut ReferenceTables<'a>) {
    let text = paragraph.text.as_str();
    for token in ACRONYM_TOKEN_REGEX.find_iter(text) {
        // "(FAA)" is the definition itself, not a use
        let opened = text[..token.start()].ends_with('(');
        let closed = text[token.end()..].starts_with(')');
        if opened && closed {
            continue;
        }
        tables.acronym_usages.push(ReferenceOccurrence {
            kind: ReferenceKind::Acronym,
            target: token.as_str().to_string(),
            source_index: paragraph.index,
            raw_text: text,
            offset: token.start(),
            enclosing_section: None,
        });
    }
}
