use chrono::{DateTime, Utc};
use docstruct_core::CheckReport;
use serde::Serialize;
use std::path::Path;

/// The JSON document the CLI writes: one check report plus where it came from
#[derive(Debug, Serialize)]
pub struct ReportEnvelope {
    pub input: String,
    pub source: String,
    pub generated_at: String,
    #[serde(flatten)]
    pub report: CheckReport,
}

impl ReportEnvelope {
    pub fn new(input: &Path, source: &str, report: CheckReport) -> Self {
        Self::at(input, source, report, Utc::now())
    }

    pub fn at(input: &Path, source: &str, report: CheckReport, generated_at: DateTime<Utc>) -> Self {
        Self {
            input: input.display().to_string(),
            source: source.to_string(),
            generated_at: generated_at.to_rfc3339(),
            report,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// One line per severity, for `--summary`
    pub fn summary_lines(&self) -> Vec<String> {
        let summary = &self.report.summary;
        vec![
            format!("   - Errors: {}", summary.errors),
            format!("   - Warnings: {}", summary.warnings),
            format!("   - Info: {}", summary.info),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use docstruct_core::{ConsistencyEngine, DocumentType, ParagraphRecord, ProfileManager};
    use pretty_assertions::assert_eq;

    fn sample_report() -> CheckReport {
        let engine = ConsistencyEngine::new(&ProfileManager::builtin(DocumentType::Rule)).unwrap();
        let paragraphs = vec![
            ParagraphRecord::new(0, "1. Background."),
            ParagraphRecord::new(1, "See paragraph 4."),
        ];
        engine.run(&paragraphs).unwrap()
    }

    #[test]
    fn test_envelope_flattens_report() {
        let when = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let envelope = ReportEnvelope::at(Path::new("rule.json"), "JsonParagraphSource", sample_report(), when);
        let value: serde_json::Value = serde_json::from_str(&envelope.to_json().unwrap()).unwrap();

        assert_eq!(value["input"], "rule.json");
        assert_eq!(value["generated_at"], "2024-03-01T12:00:00+00:00");
        assert_eq!(value["document_type"], "Rule");
        assert_eq!(value["paragraph_count"], 2);
        assert!(value["findings"]
            .as_array()
            .unwrap()
            .iter()
            .any(|f| f["message"] == "Reference to non-existent section 4"));
    }

    #[test]
    fn test_summary_lines() {
        let report = sample_report();
        let errors = report.summary.errors;
        assert!(errors > 0);

        let envelope = ReportEnvelope::new(Path::new("x"), "PlainTextSource", report);
        let lines = envelope.summary_lines();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], format!("   - Errors: {errors}"));
    }
}
