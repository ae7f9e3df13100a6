use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Input: the paragraph stream supplied by a document model
// ============================================================================

/// One paragraph of the source document, in original order.
///
/// Records are owned by the caller and never modified by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphRecord {
    pub index: usize,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_name: Option<String>,
    #[serde(default)]
    pub runs: Vec<Run>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
    #[serde(default)]
    pub italic: bool,
    /// Native footnote-reference id, present only when the document model exposes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footnote_id: Option<u32>,
}

impl ParagraphRecord {
    /// Convenience constructor for a bare paragraph with one run
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            index,
            runs: vec![Run::plain(text.clone())],
            text,
            style_name: None,
        }
    }

    pub fn with_style(mut self, style_name: impl Into<String>) -> Self {
        self.style_name = Some(style_name.into());
        self
    }

    pub fn with_runs(mut self, runs: Vec<Run>) -> Self {
        self.runs = runs;
        self
    }
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            italic: false,
            footnote_id: None,
        }
    }

    pub fn footnote(id: u32) -> Self {
        Self {
            text: String::new(),
            italic: false,
            footnote_id: Some(id),
        }
    }
}

// ============================================================================
// Symbols: structural declarations
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingSymbol {
    pub level: usize,
    /// Empty for style-derived headings
    pub number_path: Vec<u32>,
    pub normalized_text: String,
    pub source_index: usize,
}

impl HeadingSymbol {
    /// Dotted form of the number path ("2.1"), None for style-derived headings
    pub fn section_id(&self) -> Option<String> {
        if self.number_path.is_empty() {
            return None;
        }
        Some(join_number_path(&self.number_path))
    }
}

pub fn join_number_path(path: &[u32]) -> String {
    path.iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(".")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FootnoteOccurrence {
    pub number: u32,
    pub source_index: usize,
    pub scope_id: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaptionKind {
    Table,
    Figure,
}

impl fmt::Display for CaptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptionKind::Table => write!(f, "Table"),
            CaptionKind::Figure => write!(f, "Figure"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionSymbol {
    pub kind: CaptionKind,
    /// Kept verbatim ("3-2" vs "3.2") for numbering-convention checks
    pub id: String,
    pub source_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcronymDefinition {
    pub acronym: String,
    pub definition: String,
    pub source_index: usize,
    pub is_standard: bool,
    /// Byte offset of the acronym inside its paragraph
    pub offset: usize,
}

// ============================================================================
// References: prose occurrences that must resolve to a symbol
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceKind {
    Section,
    Table,
    Figure,
    Appendix,
    Acronym,
}

impl ReferenceKind {
    pub fn caption_kind(&self) -> Option<CaptionKind> {
        match self {
            ReferenceKind::Table => Some(CaptionKind::Table),
            ReferenceKind::Figure => Some(CaptionKind::Figure),
            _ => None,
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReferenceKind::Section => "section",
            ReferenceKind::Table => "table",
            ReferenceKind::Figure => "figure",
            ReferenceKind::Appendix => "appendix",
            ReferenceKind::Acronym => "acronym",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceOccurrence<'a> {
    pub kind: ReferenceKind,
    pub target: String,
    pub source_index: usize,
    /// Text of the paragraph the occurrence was found in
    pub raw_text: &'a str,
    pub offset: usize,
    /// Dotted number path of the nearest preceding numbered heading
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enclosing_section: Option<String>,
}

// ============================================================================
// Findings
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FindingCategory {
    StructuralInconsistency,
    UnresolvedReference,
    DefinitionConflict,
    UnusedDefinition,
    InputMalformed,
    MissingRequiredHeading,
    ConventionMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_index: Option<usize>,
    pub category: FindingCategory,
}

impl Finding {
    pub fn new(
        severity: Severity,
        category: FindingCategory,
        source_index: Option<usize>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            message: message.into(),
            source_index,
            category,
        }
    }

    pub fn error(category: FindingCategory, source_index: Option<usize>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, category, source_index, message)
    }

    pub fn warning(category: FindingCategory, source_index: Option<usize>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, category, source_index, message)
    }

    pub fn info(category: FindingCategory, source_index: Option<usize>, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, category, source_index, message)
    }
}

// ============================================================================
// Tables shared by every validator
// ============================================================================

/// Output of the symbol extraction pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct SymbolTables {
    pub headings: Vec<HeadingSymbol>,
    pub footnotes: Vec<FootnoteOccurrence>,
    pub captions: Vec<CaptionSymbol>,
    pub acronyms: Vec<AcronymDefinition>,
    /// Findings raised while extracting (definition conflicts, malformed captions)
    pub findings: Vec<Finding>,
}

/// Output of the reference extraction pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReferenceTables<'a> {
    pub cross_references: Vec<ReferenceOccurrence<'a>>,
    pub acronym_usages: Vec<ReferenceOccurrence<'a>>,
}

impl ReferenceTables<'_> {
    pub fn len(&self) -> usize {
        self.cross_references.len() + self.acronym_usages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Document types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DocumentType {
    #[serde(rename = "Advisory Circular")]
    AdvisoryCircular,
    #[serde(rename = "Airworthiness Criteria")]
    AirworthinessCriteria,
    #[serde(rename = "Deviation Memo")]
    DeviationMemo,
    Exemption,
    #[serde(rename = "Federal Register Notice")]
    FederalRegisterNotice,
    Order,
    #[serde(rename = "Policy Statement")]
    PolicyStatement,
    Rule,
    #[serde(rename = "Special Condition")]
    SpecialCondition,
    #[serde(rename = "Technical Standard Order")]
    TechnicalStandardOrder,
    Other,
}

impl DocumentType {
    pub const ALL: [DocumentType; 11] = [
        DocumentType::AdvisoryCircular,
        DocumentType::AirworthinessCriteria,
        DocumentType::DeviationMemo,
        DocumentType::Exemption,
        DocumentType::FederalRegisterNotice,
        DocumentType::Order,
        DocumentType::PolicyStatement,
        DocumentType::Rule,
        DocumentType::SpecialCondition,
        DocumentType::TechnicalStandardOrder,
        DocumentType::Other,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            DocumentType::AdvisoryCircular => "Advisory Circular",
            DocumentType::AirworthinessCriteria => "Airworthiness Criteria",
            DocumentType::DeviationMemo => "Deviation Memo",
            DocumentType::Exemption => "Exemption",
            DocumentType::FederalRegisterNotice => "Federal Register Notice",
            DocumentType::Order => "Order",
            DocumentType::PolicyStatement => "Policy Statement",
            DocumentType::Rule => "Rule",
            DocumentType::SpecialCondition => "Special Condition",
            DocumentType::TechnicalStandardOrder => "Technical Standard Order",
            DocumentType::Other => "Other",
        }
    }

    /// Lenient lookup used by the CLI: "advisory-circular", "Advisory Circular" and "AC" all work
    pub fn parse_name(name: &str) -> Option<Self> {
        let folded: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        let found = match folded.as_str() {
            "ac" => Some(DocumentType::AdvisoryCircular),
            "frn" => Some(DocumentType::FederalRegisterNotice),
            "tso" => Some(DocumentType::TechnicalStandardOrder),
            _ => None,
        };
        found.or_else(|| {
            Self::ALL.iter().copied().find(|doc_type| {
                doc_type
                    .display_name()
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric())
                    .collect::<String>()
                    .eq_ignore_ascii_case(&folded)
            })
        })
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_id_joins_path() {
        let heading = HeadingSymbol {
            level: 3,
            number_path: vec![2, 1, 4],
            normalized_text: "Scope".to_string(),
            source_index: 7,
        };
        assert_eq!(heading.section_id().as_deref(), Some("2.1.4"));
    }

    #[test]
    fn test_style_heading_has_no_section_id() {
        let heading = HeadingSymbol {
            level: 1,
            number_path: Vec::new(),
            normalized_text: "Appendix A".to_string(),
            source_index: 0,
        };
        assert_eq!(heading.section_id(), None);
    }

    #[test]
    fn test_paragraph_json_defaults() {
        let paragraph: ParagraphRecord =
            serde_json::from_str(r#"{"index": 3, "text": "Purpose."}"#).unwrap();
        assert_eq!(paragraph.index, 3);
        assert!(paragraph.style_name.is_none());
        assert!(paragraph.runs.is_empty());
    }

    #[test]
    fn test_document_type_lenient_names() {
        assert_eq!(
            DocumentType::parse_name("advisory-circular"),
            Some(DocumentType::AdvisoryCircular)
        );
        assert_eq!(DocumentType::parse_name("AC"), Some(DocumentType::AdvisoryCircular));
        assert_eq!(
            DocumentType::parse_name("Technical Standard Order"),
            Some(DocumentType::TechnicalStandardOrder)
        );
        assert_eq!(DocumentType::parse_name("memo"), None);
    }

    #[test]
    fn test_document_type_yaml_name() {
        let doc_type: DocumentType = serde_yaml::from_str("Policy Statement").unwrap();
        assert_eq!(doc_type, DocumentType::PolicyStatement);
    }

    #[test]
    fn test_finding_omits_missing_index() {
        let finding = Finding::error(
            FindingCategory::StructuralInconsistency,
            None,
            "Document has no level-1 heading",
        );
        let json = serde_json::to_value(&finding).unwrap();
        assert!(json.get("source_index").is_none());
        assert_eq!(json["severity"], "Error");
    }
}
