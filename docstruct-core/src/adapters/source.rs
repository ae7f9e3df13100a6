use super::{JsonParagraphSource, PlainTextSource, WordMlSource};
use crate::types::ParagraphRecord;
use anyhow::{Context, Result};
use std::path::Path;

/// Converts one upstream representation into the engine's paragraph stream.
///
/// Adapters number paragraphs from 0 in reading order.
pub trait ParagraphSource {
    fn read(&self, input: &str) -> Result<Vec<ParagraphRecord>>;

    /// Read and convert a file
    fn read_file(&self, path: &Path) -> Result<Vec<ParagraphRecord>> {
        let input = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        self.read(&input)
    }

    /// Adapter name for logging
    fn name(&self) -> &str;

    fn supports_file_type(&self, path: &Path) -> bool;
}

/// Pick an adapter by file extension; anything unrecognized is plain text
pub fn source_for_path(path: &Path) -> Box<dyn ParagraphSource> {
    let candidates: [Box<dyn ParagraphSource>; 2] =
        [Box::new(JsonParagraphSource), Box::new(WordMlSource)];

    candidates
        .into_iter()
        .find(|source| source.supports_file_type(path))
        .unwrap_or_else(|| Box::new(PlainTextSource))
}

pub(crate) fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(wanted))
        .unwrap_or(false)
}
