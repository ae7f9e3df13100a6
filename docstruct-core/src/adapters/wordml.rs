//! WordprocessingML body adapter.
//!
//! Reads the `word/document.xml` part of a .docx (already unpacked by the
//! caller) and keeps what the engine needs: paragraph style, run text,
//! italic flags and native footnote-reference ids.

use super::source::{has_extension, ParagraphSource};
use crate::extract::detectors::heading_style_level;
use crate::types::{ParagraphRecord, Run};
use anyhow::{Context, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::path::Path;

pub struct WordMlSource;

#[derive(Default)]
struct PendingParagraph {
    style_name: Option<String>,
    runs: Vec<Run>,
}

impl PendingParagraph {
    fn finish(self, index: usize) -> Option<ParagraphRecord> {
        let text: String = self.runs.iter().map(|r| r.text.as_str()).collect();
        let has_footnote = self.runs.iter().any(|r| r.footnote_id.is_some());
        if text.trim().is_empty() && !has_footnote {
            return None;
        }
        Some(ParagraphRecord {
            index,
            text,
            style_name: self.style_name,
            runs: self.runs,
        })
    }
}

fn attribute(element: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == name {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// "Heading1" style ids become "Heading 1"
fn normalize_style(style_id: &str) -> String {
    match heading_style_level(style_id) {
        Some(level) => format!("Heading {level}"),
        None => style_id.to_string(),
    }
}

impl WordMlSource {
    /// Handles elements that carry their data in attributes; these show up
    /// as either empty or start tags depending on the producer.
    fn apply_element(
        element: &BytesStart<'_>,
        paragraph: &mut Option<PendingParagraph>,
        run: &mut Option<Run>,
    ) -> Result<()> {
        match element.local_name().as_ref() {
            b"pStyle" => {
                if let (Some(p), Some(style)) = (paragraph.as_mut(), attribute(element, b"val")?) {
                    p.style_name = Some(normalize_style(&style));
                }
            }
            b"i" => {
                if let Some(r) = run.as_mut() {
                    let value = attribute(element, b"val")?;
                    r.italic = !matches!(value.as_deref(), Some("0") | Some("false") | Some("off"));
                }
            }
            b"footnoteReference" => {
                if let Some(r) = run.as_mut() {
                    r.footnote_id = attribute(element, b"id")?.and_then(|id| id.parse::<u32>().ok());
                }
            }
            b"tab" => {
                if let Some(r) = run.as_mut() {
                    r.text.push('\t');
                }
            }
            _ => {}
        }
        Ok(())
    }
}

impl ParagraphSource for WordMlSource {
    fn read(&self, input: &str) -> Result<Vec<ParagraphRecord>> {
        let mut reader = Reader::from_str(input);
        let mut paragraphs = Vec::new();
        let mut paragraph: Option<PendingParagraph> = None;
        let mut run: Option<Run> = None;
        let mut in_text = false;

        loop {
            let event = reader
                .read_event()
                .with_context(|| format!("malformed WordprocessingML at byte {}", reader.buffer_position()))?;

            match event {
                Event::Start(element) => match element.local_name().as_ref() {
                    b"p" => paragraph = Some(PendingParagraph::default()),
                    b"r" => run = Some(Run::plain(String::new())),
                    b"t" => in_text = true,
                    _ => Self::apply_element(&element, &mut paragraph, &mut run)?,
                },
                Event::Empty(element) => match element.local_name().as_ref() {
                    b"p" => {}
                    b"br" | b"cr" => {
                        if let Some(r) = run.as_mut() {
                            r.text.push(' ');
                        }
                    }
                    _ => Self::apply_element(&element, &mut paragraph, &mut run)?,
                },
                Event::Text(text) if in_text => {
                    if let Some(r) = run.as_mut() {
                        r.text.push_str(&text.unescape()?);
                    }
                }
                Event::End(element) => match element.local_name().as_ref() {
                    b"t" => in_text = false,
                    b"r" => {
                        if let (Some(p), Some(r)) = (paragraph.as_mut(), run.take()) {
                            p.runs.push(r);
                        }
                    }
                    b"p" => {
                        if let Some(record) = paragraph.take().and_then(|p| p.finish(paragraphs.len())) {
                            paragraphs.push(record);
                        }
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(paragraphs)
    }

    fn name(&self) -> &str {
        "WordMlSource"
    }

    fn supports_file_type(&self, path: &Path) -> bool {
        has_extension(path, "xml")
    }
}
