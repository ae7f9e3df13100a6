use super::source::ParagraphSource;
use crate::types::ParagraphRecord;
use anyhow::Result;
use std::path::Path;

/// One paragraph per non-blank line; no styles, no native footnotes
pub struct PlainTextSource;

impl ParagraphSource for PlainTextSource {
    fn read(&self, input: &str) -> Result<Vec<ParagraphRecord>> {
        Ok(input
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty())
            .enumerate()
            .map(|(index, line)| ParagraphRecord::new(index, line))
            .collect())
    }

    fn name(&self) -> &str {
        "PlainTextSource"
    }

    fn supports_file_type(&self, _path: &Path) -> bool {
        true
    }
}
