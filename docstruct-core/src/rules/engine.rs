use crate::config::{CompiledProfile, DocumentProfile};
use crate::error::{CheckError, CheckResult};
use crate::extract::{ReferenceExtractor, SymbolExtractor};
use crate::report::{aggregate, CheckReport, SeveritySummary, SymbolCounts, ValidatorOutput, ValidatorTiming};
use crate::types::*;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::acronym_usage::AcronymUsageValidator;
use super::cross_reference::CrossReferenceValidator;
use super::footnote_sequence::FootnoteSequenceValidator;
use super::heading_hierarchy::HeadingHierarchyValidator;

/// Priority of findings raised during extraction
pub const EXTRACTION_PRIORITY: u8 = 0;

/// Read-only view shared by every validator
pub struct ValidationContext<'a> {
    pub symbols: &'a SymbolTables,
    pub references: &'a ReferenceTables<'a>,
    pub profile: &'a CompiledProfile,
}

/// One consistency pass over the shared tables.
///
/// Validators hold no state between calls and never see each other's
/// output, so they can run in any order.
pub trait Validator {
    fn validate(&self, context: &ValidationContext<'_>) -> Vec<Finding>;

    fn name(&self) -> &str;

    /// Tie-breaker for findings on the same paragraph; lower sorts first
    fn priority(&self) -> u8;
}

pub fn validator_by_name(name: &str) -> Option<Box<dyn Validator>> {
    match name {
        "HeadingHierarchy" => Some(Box::new(HeadingHierarchyValidator)),
        "FootnoteSequence" => Some(Box::new(FootnoteSequenceValidator)),
        "CrossReference" => Some(Box::new(CrossReferenceValidator)),
        "AcronymUsage" => Some(Box::new(AcronymUsageValidator)),
        _ => None,
    }
}

/// Extraction plus the configured validator pipeline for one compiled profile.
///
/// Build it once per profile and call [`check`](Self::check) for each document.
pub struct ConsistencyEngine {
    profile: CompiledProfile,
}

impl ConsistencyEngine {
    pub fn new(profile: &DocumentProfile) -> CheckResult<Self> {
        Ok(Self::from_compiled(profile.compile()?))
    }

    pub fn from_compiled(profile: CompiledProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &CompiledProfile {
        &self.profile
    }

    pub fn check(&self, paragraphs: &[ParagraphRecord]) -> CheckResult<Vec<Finding>> {
        Ok(self.run(paragraphs)?.findings)
    }

    pub fn run(&self, paragraphs: &[ParagraphRecord]) -> CheckResult<CheckReport> {
        ensure_ordered(paragraphs)?;

        info!(
            "Checking {} paragraphs as {}",
            paragraphs.len(),
            self.profile.profile.document_type
        );

        let extraction_start = Instant::now();
        let symbols = SymbolExtractor::new(&self.profile).extract(paragraphs);
        let references = ReferenceExtractor.extract(paragraphs, &symbols);

        let mut outputs = vec![ValidatorOutput {
            name: "Extraction".to_string(),
            priority: EXTRACTION_PRIORITY,
            findings: symbols.findings.clone(),
            elapsed: extraction_start.elapsed(),
        }];

        let context = ValidationContext {
            symbols: &symbols,
            references: &references,
            profile: &self.profile,
        };

        for validator_config in &self.profile.profile.validators {
            if !validator_config.enabled {
                debug!("Skipping disabled validator: {}", validator_config.name);
                continue;
            }

            let Some(validator) = validator_by_name(&validator_config.name) else {
                warn!("Unknown validator: {}. Skipping...", validator_config.name);
                continue;
            };

            let start = Instant::now();
            let findings = validator.validate(&context);
            let elapsed = start.elapsed();
            debug!(
                "{} produced {} findings in {:?}",
                validator.name(),
                findings.len(),
                elapsed
            );

            outputs.push(ValidatorOutput {
                name: validator.name().to_string(),
                priority: validator.priority(),
                findings,
                elapsed,
            });
        }

        let findings = aggregate(&outputs);
        info!("Check finished with {} findings", findings.len());

        Ok(CheckReport {
            document_type: self.profile.profile.document_type,
            profile_fingerprint: self.profile.fingerprint.clone(),
            paragraph_count: paragraphs.len(),
            symbols: SymbolCounts {
                headings: symbols.headings.len(),
                footnotes: symbols.footnotes.len(),
                captions: symbols.captions.len(),
                acronym_definitions: symbols.acronyms.len(),
                references: references.len(),
            },
            summary: SeveritySummary::from_findings(&findings),
            validators: outputs
                .iter()
                .map(|output| ValidatorTiming {
                    name: output.name.clone(),
                    findings: output.findings.len(),
                    elapsed_us: output.elapsed.as_micros(),
                })
                .collect(),
            findings,
        })
    }
}

/// Paragraph indices must strictly increase
fn ensure_ordered(paragraphs: &[ParagraphRecord]) -> CheckResult<()> {
    for (position, pair) in paragraphs.windows(2).enumerate() {
        if pair[1].index <= pair[0].index {
            return Err(CheckError::UnorderedInput {
                position: position + 1,
                previous: pair[0].index,
                found: pair[1].index,
            });
        }
    }
    Ok(())
}

/// Check one document against a profile
pub fn check(paragraphs: &[ParagraphRecord], profile: &DocumentProfile) -> CheckResult<Vec<Finding>> {
    ConsistencyEngine::new(profile)?.check(paragraphs)
}
