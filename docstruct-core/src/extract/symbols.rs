use super::detectors::{
    is_appendix_heading, select_footnote_scanner, HeadingDetector, NumberedHeadingDetector,
    StyleHeadingDetector,
};
use crate::config::CompiledProfile;
use crate::types::*;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

static CAPTION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(table|figure)\s+(\d+(?:[-.]\d+)?)(?:$|[^\w-])").unwrap()
});

// A caption lead token followed by something number-like
static CAPTION_LEAD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(table|figure)\s+\d").unwrap());

static ACRONYM_DEFINITION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\w\s&]{2,}?)\s*\(([A-Z]{2,})\)").unwrap());

const FILLER_WORDS: &[&str] = &["a", "an", "and", "for", "in", "of", "on", "the", "to", "&"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptionParse {
    Caption(CaptionKind, String),
    /// Lead token present but the id could not be read
    Malformed(CaptionKind),
}

/// Reads a caption from the start of a paragraph
pub fn parse_caption(text: &str) -> Option<CaptionParse> {
    let text = text.trim_start();
    if let Some(captures) = CAPTION_REGEX.captures(text) {
        let kind = caption_kind(captures.get(1)?.as_str())?;
        let id = captures.get(2)?.as_str().to_string();
        return Some(CaptionParse::Caption(kind, id));
    }

    let lead = CAPTION_LEAD_REGEX.captures(text)?;
    Some(CaptionParse::Malformed(caption_kind(lead.get(1)?.as_str())?))
}

pub fn is_caption_paragraph(text: &str) -> bool {
    CAPTION_LEAD_REGEX.is_match(text.trim_start())
}

fn caption_kind(word: &str) -> Option<CaptionKind> {
    match word.to_lowercase().as_str() {
        "table" => Some(CaptionKind::Table),
        "figure" => Some(CaptionKind::Figure),
        _ => None,
    }
}

/// Cut the definition down to the words the acronym abbreviates.
///
/// The definition pattern grabs everything back to the previous punctuation,
/// so "We rely on the Federal Aviation Administration" must shrink to
/// "Federal Aviation Administration". The term is the capitalized run ending
/// at the parenthesis (filler words may sit inside it), capped at one
/// significant word per acronym letter. A lower-case term ("advisory
/// circular (AC)") takes one word per letter instead.
pub fn trim_definition(full_term: &str, acronym: &str) -> String {
    let words: Vec<&str> = full_term.split_whitespace().collect();
    let wanted = acronym.chars().count();

    let mut start = capitalized_run_start(&words, wanted);
    if start == words.len() {
        start = counted_run_start(&words, wanted);
    }

    // Leading filler never belongs to the term
    while start < words.len() && is_filler(words[start]) {
        start += 1;
    }

    words[start..].join(" ")
}

fn capitalized_run_start(words: &[&str], wanted: usize) -> usize {
    let mut start = words.len();
    let mut significant = 0;
    while start > 0 && significant < wanted {
        let word = words[start - 1];
        if is_filler(word) {
            start -= 1;
        } else if word.chars().next().is_some_and(char::is_uppercase) {
            start -= 1;
            significant += 1;
        } else {
            break;
        }
    }
    if significant == 0 {
        words.len()
    } else {
        start
    }
}

fn counted_run_start(words: &[&str], wanted: usize) -> usize {
    let mut start = words.len();
    let mut significant = 0;
    while start > 0 && significant < wanted {
        start -= 1;
        if !is_filler(words[start]) {
            significant += 1;
        }
    }
    start
}

fn is_filler(word: &str) -> bool {
    FILLER_WORDS.contains(&word.to_lowercase().as_str())
}

/// Case-folded with a leading "the " removed
pub fn normalize_definition(definition: &str) -> String {
    let folded = definition
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    folded
        .strip_prefix("the ")
        .map(str::to_string)
        .unwrap_or(folded)
}

/// The first expansion seen for an acronym; later ones are compared to it
struct FirstDefinition {
    normalized: String,
    text: String,
    source_index: usize,
}

/// Single pass over the paragraph stream producing every symbol table
pub struct SymbolExtractor<'p> {
    profile: &'p CompiledProfile,
    heading_detectors: Vec<Box<dyn HeadingDetector>>,
}

impl<'p> SymbolExtractor<'p> {
    pub fn new(profile: &'p CompiledProfile) -> Self {
        Self {
            profile,
            heading_detectors: vec![Box::new(NumberedHeadingDetector), Box::new(StyleHeadingDetector)],
        }
    }

    pub fn extract(&self, paragraphs: &[ParagraphRecord]) -> SymbolTables {
        let footnote_scanner = select_footnote_scanner(paragraphs);
        debug!("Footnote detection strategy: {}", footnote_scanner.name());

        let mut tables = SymbolTables::default();
        let mut scope_id = 0;
        let mut first_definitions: HashMap<String, FirstDefinition> = HashMap::new();

        for paragraph in paragraphs {
            if let Some(heading) = self.detect_heading(paragraph) {
                tables.headings.push(heading);
            }

            if is_appendix_heading(paragraph) {
                scope_id += 1;
            }

            for number in footnote_scanner.scan(paragraph) {
                tables.footnotes.push(FootnoteOccurrence {
                    number,
                    source_index: paragraph.index,
                    scope_id,
                });
            }

            match parse_caption(&paragraph.text) {
                Some(CaptionParse::Caption(kind, id)) => tables.captions.push(CaptionSymbol {
                    kind,
                    id,
                    source_index: paragraph.index,
                }),
                Some(CaptionParse::Malformed(kind)) => tables.findings.push(Finding::warning(
                    FindingCategory::InputMalformed,
                    Some(paragraph.index),
                    format!(
                        "{kind} caption '{}' does not carry a readable {} number",
                        preview(&paragraph.text),
                        kind.to_string().to_lowercase()
                    ),
                )),
                None => {}
            }

            self.extract_definitions(paragraph, &mut first_definitions, &mut tables);
        }

        debug!(
            "Extracted {} headings, {} footnotes, {} captions, {} acronym definitions",
            tables.headings.len(),
            tables.footnotes.len(),
            tables.captions.len(),
            tables.acronyms.len()
        );

        tables
    }

    fn detect_heading(&self, paragraph: &ParagraphRecord) -> Option<HeadingSymbol> {
        self.heading_detectors
            .iter()
            .find_map(|detector| detector.detect(paragraph))
    }

    fn extract_definitions(
        &self,
        paragraph: &ParagraphRecord,
        first_definitions: &mut HashMap<String, FirstDefinition>,
        tables: &mut SymbolTables,
    ) {
        for captures in ACRONYM_DEFINITION_REGEX.captures_iter(&paragraph.text) {
            let (Some(term), Some(acronym)) = (captures.get(1), captures.get(2)) else {
                continue;
            };
            let definition = trim_definition(term.as_str(), acronym.as_str());
            if definition.is_empty() {
                continue;
            }
            let normalized = normalize_definition(&definition);

            match first_definitions.get(acronym.as_str()) {
                Some(first) if first.normalized != normalized => {
                    tables.findings.push(Finding::warning(
                        FindingCategory::DefinitionConflict,
                        Some(paragraph.index),
                        format!(
                            "Acronym '{}' is defined as '{}' but was defined as '{}' in paragraph {}",
                            acronym.as_str(),
                            definition,
                            first.text,
                            first.source_index
                        ),
                    ));
                }
                Some(_) => {}
                None => {
                    first_definitions.insert(
                        acronym.as_str().to_string(),
                        FirstDefinition {
                            normalized,
                            text: definition.clone(),
                            source_index: paragraph.index,
                        },
                    );
                }
            }

            tables.acronyms.push(AcronymDefinition {
                acronym: acronym.as_str().to_string(),
                definition,
                source_index: paragraph.index,
                is_standard: self.profile.is_standard_acronym(acronym.as_str()),
                offset: acronym.start(),
            });
        }
    }
}

fn preview(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() > 40 {
        format!("{}...", text.chars().take(37).collect::<String>())
    } else {
        text.to_string()
    }
}
