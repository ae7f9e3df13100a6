// Extraction passes
//
// Symbol extraction collects declarations (headings, footnotes, captions,
// acronym definitions); reference extraction collects the prose occurrences
// that must resolve against them. Both are single linear scans.

pub mod detectors;
pub mod references;
pub mod symbols;

pub use detectors::{
    FootnoteScanner, HeadingDetector, NativeFootnoteScanner, NumberedHeadingDetector,
    StyleHeadingDetector, TextualFootnoteScanner,
};
pub use references::ReferenceExtractor;
pub use symbols::SymbolExtractor;
