use super::source::{has_extension, ParagraphSource};
use crate::types::ParagraphRecord;
use anyhow::{Context, Result};
use std::path::Path;

/// A JSON array of paragraph records, as exported by an upstream document model
pub struct JsonParagraphSource;

impl ParagraphSource for JsonParagraphSource {
    fn read(&self, input: &str) -> Result<Vec<ParagraphRecord>> {
        let paragraphs: Vec<ParagraphRecord> =
            serde_json::from_str(input).context("paragraph JSON must be an array of records")?;
        Ok(paragraphs)
    }

    fn name(&self) -> &str {
        "JsonParagraphSource"
    }

    fn supports_file_type(&self, path: &Path) -> bool {
        has_extension(path, "json")
    }
}
