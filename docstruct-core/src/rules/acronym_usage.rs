use super::engine::{ValidationContext, Validator};
use crate::config::CompiledProfile;
use crate::types::*;
use std::collections::{HashMap, HashSet};
use std::iter::Peekable;
use std::sync::LazyLock;

const MAX_ACRONYM_LENGTH: usize = 10;

static ROMAN_NUMERALS: LazyLock<HashSet<String>> =
    LazyLock::new(|| (1..=50).map(to_roman).collect());

fn to_roman(mut value: u32) -> String {
    const SYMBOLS: [(u32, &str); 7] = [
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut roman = String::new();
    for (amount, symbol) in SYMBOLS {
        while value >= amount {
            roman.push_str(symbol);
            value -= amount;
        }
    }
    roman
}

/// Define-before-use for acronyms.
///
/// Definitions and usages are merged by document position, so a usage only
/// counts as defined when the definition came earlier.
pub struct AcronymUsageValidator;

enum Event<'r, 'a> {
    Definition(&'r AcronymDefinition),
    Usage(&'r ReferenceOccurrence<'a>),
}

/// Yields definitions and usages in (paragraph, offset) order
struct PositionMerge<'r, 'a, D, U>
where
    D: Iterator<Item = &'r AcronymDefinition>,
    U: Iterator<Item = &'r ReferenceOccurrence<'a>>,
    'a: 'r,
{
    definitions: Peekable<D>,
    usages: Peekable<U>,
}

impl<'r, 'a, D, U> Iterator for PositionMerge<'r, 'a, D, U>
where
    D: Iterator<Item = &'r AcronymDefinition>,
    U: Iterator<Item = &'r ReferenceOccurrence<'a>>,
    'a: 'r,
{
    type Item = Event<'r, 'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let definition_first = match (self.definitions.peek(), self.usages.peek()) {
            (Some(d), Some(u)) => (d.source_index, d.offset) <= (u.source_index, u.offset),
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => return None,
        };

        if definition_first {
            self.definitions.next().map(Event::Definition)
        } else {
            self.usages.next().map(Event::Usage)
        }
    }
}

/// Paragraph-level facts reused for every token in the paragraph
struct ParagraphScope {
    source_index: usize,
    is_heading_line: bool,
    ignored_spans: Vec<(usize, usize)>,
}

impl ParagraphScope {
    fn new(usage: &ReferenceOccurrence<'_>, profile: &CompiledProfile) -> Self {
        let ignored_spans = profile
            .ignore_patterns
            .iter()
            .flat_map(|re| re.find_iter(usage.raw_text).map(|m| (m.start(), m.end())))
            .collect();

        Self {
            source_index: usage.source_index,
            is_heading_line: is_heading_line(usage.raw_text, profile),
            ignored_spans,
        }
    }

    fn is_ignored(&self, offset: usize) -> bool {
        self.ignored_spans
            .iter()
            .any(|&(start, end)| start <= offset && offset < end)
    }
}

/// All-caps line built from heading vocabulary ("RELEVANT PAST PRACTICE")
fn is_heading_line(text: &str, profile: &CompiledProfile) -> bool {
    let words: Vec<&str> = text
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| !w.is_empty())
        .collect();

    !words.is_empty()
        && words
            .iter()
            .all(|w| !w.chars().any(|c| c.is_lowercase()))
        && words.iter().any(|w| profile.heading_words.contains(*w))
}

fn follows_washington(text: &str, offset: usize) -> bool {
    text[..offset]
        .trim_end()
        .trim_end_matches(',')
        .trim_end()
        .ends_with("Washington")
}

fn is_skipped_token(
    token: &str,
    usage: &ReferenceOccurrence<'_>,
    scope: &ParagraphScope,
    profile: &CompiledProfile,
) -> bool {
    scope.is_heading_line
        || token.len() > MAX_ACRONYM_LENGTH
        || profile.common_words.contains(token)
        || profile.heading_words.contains(token)
        || ROMAN_NUMERALS.contains(token)
        || token == "USC"
        || (token == "DC" && follows_washington(usage.raw_text, usage.offset))
        || scope.is_ignored(usage.offset)
}

impl Validator for AcronymUsageValidator {
    fn validate(&self, context: &ValidationContext<'_>) -> Vec<Finding> {
        let profile = context.profile;
        let mut findings = Vec::new();

        // upper-cased acronym -> key as first defined
        let mut defined: HashMap<String, String> = HashMap::new();
        let mut used: HashSet<String> = HashSet::new();
        let mut reported: HashSet<String> = HashSet::new();
        let mut scope: Option<ParagraphScope> = None;

        let events = PositionMerge {
            definitions: context.symbols.acronyms.iter().peekable(),
            usages: context.references.acronym_usages.iter().peekable(),
        };

        for event in events {
            match event {
                Event::Definition(definition) => {
                    defined
                        .entry(definition.acronym.to_uppercase())
                        .or_insert_with(|| definition.acronym.clone());
                }
                Event::Usage(usage) => {
                    if scope.as_ref().map(|s| s.source_index) != Some(usage.source_index) {
                        scope = Some(ParagraphScope::new(usage, profile));
                    }
                    let Some(paragraph) = scope.as_ref() else { continue };

                    let token = usage.target.as_str();
                    if is_skipped_token(token, usage, paragraph, profile) {
                        continue;
                    }

                    let key = token.to_uppercase();
                    if let Some(original) = defined.get(&key) {
                        used.insert(original.clone());
                    } else if !profile.standard_acronyms.contains_key(&key) && reported.insert(key) {
                        findings.push(Finding::warning(
                            FindingCategory::UnresolvedReference,
                            Some(usage.source_index),
                            format!("Confirm '{token}' was defined at its first use"),
                        ));
                    }
                }
            }
        }

        let mut flagged: HashSet<&str> = HashSet::new();
        for definition in &context.symbols.acronyms {
            let acronym = definition.acronym.as_str();
            if used.contains(acronym) || !flagged.insert(acronym) {
                continue;
            }
            findings.push(Finding::info(
                FindingCategory::UnusedDefinition,
                Some(definition.source_index),
                format!("Acronym '{acronym}' is defined but never used"),
            ));
        }

        findings
    }

    fn name(&self) -> &str {
        "AcronymUsage"
    }

    fn priority(&self) -> u8 {
        4
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProfileManager;
    use crate::extract::{ReferenceExtractor, SymbolExtractor};

    fn run(texts: &[&str]) -> Vec<Finding> {
        let compiled = ProfileManager::builtin(DocumentType::AdvisoryCircular)
            .compile()
            .unwrap();
        let paragraphs: Vec<_> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| ParagraphRecord::new(i, *t))
            .collect();
        let symbols = SymbolExtractor::new(&compiled).extract(&paragraphs);
        let references = ReferenceExtractor.extract(&paragraphs, &symbols);
        let context = ValidationContext {
            symbols: &symbols,
            references: &references,
            profile: &compiled,
        };
        AcronymUsageValidator.validate(&context)
    }

    #[test]
    fn test_roman_numerals() {
        assert_eq!(to_roman(4), "IV");
        assert_eq!(to_roman(49), "XLIX");
        assert!(ROMAN_NUMERALS.contains("XII"));
        assert!(!ROMAN_NUMERALS.contains("LX"));
        assert!(!ROMAN_NUMERALS.contains("IIII"));
    }

    #[test]
    fn test_defined_then_used() {
        let findings = run(&[
            "The Federal Aviation Administration (FAA) regulates aviation. FAA oversees safety.",
        ]);
        assert!(findings.is_empty(), "{findings:?}");
    }

    #[test]
    fn test_undefined_reported_once() {
        let findings = run(&["The QZX launched a rocket.", "QZX did it again."]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].message, "Confirm 'QZX' was defined at its first use");
        assert_eq!(findings[0].source_index, Some(0));
    }

    #[test]
    fn test_use_before_definition() {
        let findings = run(&[
            "The DER signs the form.",
            "A Designated Engineering Representative (DER) reviews data. The DER signs.",
        ]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].source_index, Some(0));
        assert_eq!(findings[0].category, FindingCategory::UnresolvedReference);
    }

    #[test]
    fn test_unused_definition() {
        let findings = run(&["The Designated Engineering Representative (DER) reviews data."]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Info);
        assert_eq!(findings[0].message, "Acronym 'DER' is defined but never used");
    }

    #[test]
    fn test_special_cases_not_flagged() {
        for text in [
            "Meet in Washington DC next week.",
            "Meet in Washington, DC next week.",
            "Refer to 42 USC 1981 for details.",
            "Section IV covers procedures.",
            "The CAT sat on the mat.",
            "Follow AC 25.1309-1A for guidance.",
            "CURRENT REGULATORY AND ADVISORY MATERIAL",
            "Docket FAA-2023-1234 applies.",
        ] {
            let findings = run(&[text]);
            assert!(findings.is_empty(), "{text}: {findings:?}");
        }
    }

    #[test]
    fn test_standard_vocabulary_needs_no_definition() {
        assert!(run(&["Submit the PDF to the DOT office."]).is_empty());
    }
}
