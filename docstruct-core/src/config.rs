use crate::error::{CheckError, CheckResult};
use crate::types::DocumentType;
use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use tracing::warn;

// Default value functions for serde
fn default_true() -> bool {
    true
}

/// Caption/reference numbering convention for a class of document types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberingConvention {
    /// "Table 4-1"
    Hyphenated,
    /// "Table 4"
    Plain,
}

impl NumberingConvention {
    pub fn for_document_type(doc_type: DocumentType) -> Self {
        match doc_type {
            DocumentType::AdvisoryCircular | DocumentType::Order => NumberingConvention::Hyphenated,
            _ => NumberingConvention::Plain,
        }
    }

    pub fn accepts(&self, id: &str) -> bool {
        match self {
            NumberingConvention::Hyphenated => id.contains('-'),
            NumberingConvention::Plain => !id.contains('-'),
        }
    }

    /// The id rewritten to follow this convention
    pub fn suggest(&self, id: &str) -> String {
        match self {
            NumberingConvention::Hyphenated => match id.split_once('.') {
                Some((major, minor)) => format!("{major}-{minor}"),
                None => format!("{id}-1"),
            },
            NumberingConvention::Plain => id.split('-').next().unwrap_or(id).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredHeading {
    pub name: String,
    /// Optional/conditional headings are reported as Info when absent
    #[serde(default)]
    pub optional: bool,
    /// When the heading applies, echoed in the Info message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl RequiredHeading {
    pub fn required(name: &str) -> Self {
        Self {
            name: name.to_string(),
            optional: false,
            condition: None,
        }
    }

    pub fn conditional(name: &str, condition: &str) -> Self {
        Self {
            name: name.to_string(),
            optional: true,
            condition: Some(condition.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Name of the validator
    pub name: String,
    /// Whether this validator is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_validators() -> Vec<ValidatorConfig> {
    [
        "HeadingHierarchy",
        "FootnoteSequence",
        "CrossReference",
        "AcronymUsage",
    ]
    .iter()
    .map(|name| ValidatorConfig {
        name: name.to_string(),
        enabled: true,
    })
    .collect()
}

/// Per-document-type rules consumed by the consistency engine.
///
/// Pure data: load it from YAML or take a built-in one from [`ProfileManager`],
/// then [`compile`](DocumentProfile::compile) it once and reuse it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentProfile {
    pub document_type: DocumentType,
    #[serde(default)]
    pub required_headings: Vec<RequiredHeading>,
    /// Falls back to the document type's convention when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numbering: Option<NumberingConvention>,
    /// Acronym -> canonical definition; never needs an in-document definition
    #[serde(default = "default_standard_acronyms")]
    pub standard_acronyms: BTreeMap<String, String>,
    /// Acronym candidates inside a match are never evaluated
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,
    /// Legal citations that look like references but are exempt from resolution
    #[serde(default = "default_skip_patterns")]
    pub skip_patterns: Vec<String>,
    /// Upper-case words that are ordinary vocabulary, not acronyms
    #[serde(default = "default_common_words")]
    pub common_words: Vec<String>,
    /// All-caps heading vocabulary ("PURPOSE", "SUMMARY")
    #[serde(default = "default_heading_words")]
    pub heading_words: Vec<String>,
    /// Validators to run, in order
    #[serde(default = "default_validators")]
    pub validators: Vec<ValidatorConfig>,
}

fn default_standard_acronyms() -> BTreeMap<String, String> {
    [
        ("ACO", "Aircraft Certification Office"),
        ("AGC", "Office of the Chief Counsel"),
        ("AIR", "Aircraft Certification Service"),
        ("CFR", "Code of Federal Regulations"),
        ("DC", "District of Columbia"),
        ("DOT", "Department of Transportation"),
        ("FAA", "Federal Aviation Administration"),
        ("FAQ", "Frequently Asked Questions"),
        ("MA", "Massachusetts"),
        ("MD", "Maryland"),
        ("MIL", "Military"),
        ("MO", "Missouri"),
        ("PDF", "Portable Document Format"),
        ("RGL", "Regulatory and Guidance Library"),
        ("SAE", "SAE International"),
        ("SSN", "Social Security Number"),
        ("TX", "Texas"),
        ("US", "United States"),
        ("USA", "United States of America"),
        ("WA", "Washington"),
        ("XX", "Placeholder"),
        ("ZIP", "Zone Improvement Plan"),
    ]
    .iter()
    .map(|(acronym, definition)| (acronym.to_string(), definition.to_string()))
    .collect()
}

fn default_ignore_patterns() -> Vec<String> {
    vec![
        r"FAA-\d{4}-\d+".to_string(),          // docket numbers
        r"\d{2}-\d{2}-\d{2}-SC".to_string(),    // special condition numbers
        r"AC\s*\d+(?:[-.]\d+)*[A-Z]*".to_string(), // AC 25.1309-1A
        r"AD\s*\d{4}-\d{2}-\d{2}".to_string(),  // airworthiness directives
        r"\d{2}-[A-Z]{2,}".to_string(),
        r"[A-Z]+-\d+".to_string(),
        r"§\s*[A-Z]+\.\d+".to_string(),
        r"Part\s*[A-Z]+".to_string(),
    ]
}

fn default_skip_patterns() -> Vec<String> {
    vec![
        r"(?:U\.S\.C\.|USC)\s+(?:§+\s*)?(?:Section|section)?\s*\d+".to_string(),
        r"Section\s+\d+(?:\([a-z]\))*\s+of\s+(?:the\s+)?(?:United States Code|U\.S\.C\.)".to_string(),
        r"Section\s+\d+(?:\([a-z]\))*\s+of\s+Title\s+\d+".to_string(),
        r"(?:Section|§)\s*\d+(?:\([a-z]\))*\s+of\s+the\s+Act".to_string(),
        r"Section\s+\d+\([a-z]\)".to_string(),
        r"§\s*\d+\([a-z]\)".to_string(),
        r"\d+\s*(?:CFR|C\.F\.R\.)".to_string(),
        r"Part\s+\d+(?:\.[0-9]+)*\s+of\s+Title\s+\d+".to_string(),
        r"Public\s+Law\s+\d+[-–]\d+".to_string(),
        r"Title\s+\d+,\s+Section\s+\d+(?:\([a-z]\))*".to_string(),
        r"\d+\s+U\.S\.C\.\s+\d+(?:\([a-z]\))*".to_string(),
    ]
}

fn default_common_words() -> Vec<String> {
    ["API", "CAT", "CSS", "HTML", "URL", "XML", "OK", "NOTE"]
        .iter()
        .map(|w| w.to_string())
        .collect()
}

fn default_heading_words() -> Vec<String> {
    [
        "APPLICABILITY", "APPENDIX", "AUTHORITY", "BACKGROUND", "CANCELLATION", "CAUTION",
        "CHAPTER", "CONCLUSION", "DEPARTMENT", "DEFINITION", "DEFINITIONS", "DISCUSSION",
        "DISTRIBUTION", "EXCEPTION", "EXPLANATION", "FIGURE", "GENERAL", "GROUPS",
        "INFORMATION", "INSERT", "INTRODUCTION", "MATERIAL", "NOTE", "PARTS", "PAST",
        "POLICY", "PRACTICE", "PROCEDURES", "PURPOSE", "RELEVANT", "RELATED",
        "REQUIREMENTS", "REPORT", "SCOPE", "SECTION", "SUMMARY", "TABLE", "WARNING",
    ]
    .iter()
    .map(|w| w.to_string())
    .collect()
}

impl DocumentProfile {
    /// Profile with the shared vocabulary and patterns and no required headings
    pub fn for_document_type(document_type: DocumentType) -> Self {
        Self {
            document_type,
            required_headings: Vec::new(),
            numbering: None,
            standard_acronyms: default_standard_acronyms(),
            ignore_patterns: default_ignore_patterns(),
            skip_patterns: default_skip_patterns(),
            common_words: default_common_words(),
            heading_words: default_heading_words(),
            validators: default_validators(),
        }
    }

    pub fn numbering_convention(&self) -> NumberingConvention {
        self.numbering
            .unwrap_or_else(|| NumberingConvention::for_document_type(self.document_type))
    }

    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading profile {path}"))?;
        Self::from_yaml(&content).with_context(|| format!("parsing profile {path}"))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let profile: DocumentProfile = serde_yaml::from_str(content)?;
        Ok(profile)
    }

    /// Load profile with fallback to the built-in one for `document_type`
    pub fn load_with_fallback(path: Option<&str>, document_type: DocumentType) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                warn!("Failed to load profile from {p} ({e:#}), using built-in profile");
                ProfileManager::builtin(document_type)
            }),
            None => ProfileManager::builtin(document_type),
        }
    }

    /// SHA-256 of the canonical JSON form, for callers that cache compiled profiles
    pub fn fingerprint(&self) -> String {
        let canonical = serde_json::to_string(self).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Validate and compile every pattern list
    pub fn compile(&self) -> CheckResult<CompiledProfile> {
        let skip_patterns = compile_patterns("skip", &self.skip_patterns, true)?;
        let ignore_patterns = compile_patterns("ignore", &self.ignore_patterns, false)?;

        let standard_acronyms = self
            .standard_acronyms
            .iter()
            .map(|(acronym, definition)| (acronym.to_uppercase(), definition.clone()))
            .collect();

        Ok(CompiledProfile {
            fingerprint: self.fingerprint(),
            numbering: self.numbering_convention(),
            skip_patterns,
            ignore_patterns,
            standard_acronyms,
            common_words: upper_set(&self.common_words),
            heading_words: upper_set(&self.heading_words),
            profile: self.clone(),
        })
    }
}

fn compile_patterns(
    list: &'static str,
    patterns: &[String],
    case_insensitive: bool,
) -> CheckResult<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| {
            RegexBuilder::new(pattern)
                .case_insensitive(case_insensitive)
                .build()
                .map_err(|source| CheckError::InvalidPattern {
                    list,
                    pattern: pattern.clone(),
                    source,
                })
        })
        .collect()
}

fn upper_set(words: &[String]) -> HashSet<String> {
    words.iter().map(|w| w.to_uppercase()).collect()
}

/// A validated profile with its patterns compiled. Immutable, `Send + Sync`.
#[derive(Debug, Clone)]
pub struct CompiledProfile {
    pub profile: DocumentProfile,
    pub fingerprint: String,
    pub numbering: NumberingConvention,
    pub skip_patterns: Vec<Regex>,
    pub ignore_patterns: Vec<Regex>,
    /// Keys upper-cased
    pub standard_acronyms: HashMap<String, String>,
    pub common_words: HashSet<String>,
    pub heading_words: HashSet<String>,
}

impl CompiledProfile {
    pub fn is_standard_acronym(&self, acronym: &str) -> bool {
        self.standard_acronyms.contains_key(&acronym.to_uppercase())
    }

    pub fn matches_skip_pattern(&self, text: &str) -> bool {
        self.skip_patterns.iter().any(|re| re.is_match(text))
    }
}

pub struct ProfileManager {
    profiles: HashMap<DocumentType, DocumentProfile>,
    default_profile: DocumentProfile,
}

impl ProfileManager {
    pub fn new() -> Self {
        let mut manager = Self {
            profiles: HashMap::new(),
            default_profile: DocumentProfile::for_document_type(DocumentType::Other),
        };

        for doc_type in DocumentType::ALL {
            manager.profiles.insert(doc_type, Self::builtin(doc_type));
        }

        manager
    }

    pub fn get_profile(&self, doc_type: &DocumentType) -> &DocumentProfile {
        self.profiles.get(doc_type).unwrap_or(&self.default_profile)
    }

    /// Replace the profile for the file's document type
    pub fn load_profile_from_file(&mut self, path: &str) -> Result<DocumentType> {
        let profile = DocumentProfile::load_from_file(path)?;
        let doc_type = profile.document_type;
        self.profiles.insert(doc_type, profile);
        Ok(doc_type)
    }

    pub fn document_types(&self) -> Vec<DocumentType> {
        let mut types: Vec<_> = self.profiles.keys().copied().collect();
        types.sort();
        types
    }

    /// Built-in profile for a document type
    pub fn builtin(doc_type: DocumentType) -> DocumentProfile {
        let mut profile = DocumentProfile::for_document_type(doc_type);
        profile.required_headings = match doc_type {
            DocumentType::AdvisoryCircular => vec![
                RequiredHeading::required("Purpose."),
                RequiredHeading::required("Applicability."),
                RequiredHeading::conditional(
                    "Cancellation.",
                    "This section is needed only if the document cancels an earlier version.",
                ),
                RequiredHeading::required("Related Material."),
                RequiredHeading::required("Definition of Key Terms."),
            ],
            DocumentType::FederalRegisterNotice => vec![
                RequiredHeading::required("Purpose of This Notice"),
                RequiredHeading::required("Audience"),
                RequiredHeading::required("Where can I Find This Notice"),
            ],
            DocumentType::Order => vec![
                RequiredHeading::required("Purpose of This Order."),
                RequiredHeading::required("Audience."),
                RequiredHeading::required("Where to Find This Order."),
            ],
            DocumentType::PolicyStatement => [
                "SUMMARY",
                "CURRENT REGULATORY AND ADVISORY MATERIAL",
                "RELEVANT PAST PRACTICE",
                "POLICY",
                "EFFECT OF POLICY",
                "CONCLUSION",
            ]
            .iter()
            .map(|name| RequiredHeading::required(name))
            .collect(),
            DocumentType::TechnicalStandardOrder => [
                "PURPOSE.",
                "APPLICABILITY.",
                "REQUIREMENTS.",
                "MARKING.",
                "APPLICATION DATA REQUIREMENTS.",
                "MANUFACTURER DATA REQUIREMENTS.",
                "FURNISHED DATA REQUIREMENTS.",
                "HOW TO GET REFERENCED DOCUMENTS.",
            ]
            .iter()
            .map(|name| RequiredHeading::required(name))
            .collect(),
            _ => Vec::new(),
        };
        profile
    }
}

impl Default for ProfileManager {
    fn default() -> Self {
        Self::new()
    }
}
