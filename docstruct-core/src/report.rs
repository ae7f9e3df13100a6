use crate::types::{DocumentType, Finding, Severity};
use serde::Serialize;
use std::time::Duration;

/// Findings produced by one validator (or by extraction, priority 0)
#[derive(Debug, Clone)]
pub struct ValidatorOutput {
    pub name: String,
    pub priority: u8,
    pub findings: Vec<Finding>,
    pub elapsed: Duration,
}

/// Merge validator outputs into one list ordered by paragraph, then validator
/// priority. Document-level findings (no paragraph) go last. Emission order
/// inside one validator is preserved, so the result does not depend on the
/// order validators ran in.
pub fn aggregate(outputs: &[ValidatorOutput]) -> Vec<Finding> {
    let mut keyed: Vec<((bool, usize, u8), &Finding)> = outputs
        .iter()
        .flat_map(|output| {
            output.findings.iter().map(move |finding| {
                let key = (
                    finding.source_index.is_none(),
                    finding.source_index.unwrap_or(usize::MAX),
                    output.priority,
                );
                (key, finding)
            })
        })
        .collect();

    keyed.sort_by_key(|(key, _)| *key);
    keyed.into_iter().map(|(_, finding)| finding.clone()).collect()
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SeveritySummary {
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
}

impl SeveritySummary {
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut summary = Self::default();
        for finding in findings {
            match finding.severity {
                Severity::Error => summary.errors += 1,
                Severity::Warning => summary.warnings += 1,
                Severity::Info => summary.info += 1,
            }
        }
        summary
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidatorTiming {
    pub name: String,
    pub findings: usize,
    pub elapsed_us: u128,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SymbolCounts {
    pub headings: usize,
    pub footnotes: usize,
    pub captions: usize,
    pub acronym_definitions: usize,
    pub references: usize,
}

/// Everything one check produced, for callers that want more than the Finding list
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub document_type: DocumentType,
    pub profile_fingerprint: String,
    pub paragraph_count: usize,
    pub symbols: SymbolCounts,
    pub summary: SeveritySummary,
    pub validators: Vec<ValidatorTiming>,
    pub findings: Vec<Finding>,
}

impl CheckReport {
    pub fn has_errors(&self) -> bool {
        self.summary.errors > 0
    }
}
