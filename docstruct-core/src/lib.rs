// Docstruct Core Library
//
// Structural and terminology consistency engine for formal regulatory
// documents. Extracts declarations (headings, footnotes, captions, acronym
// definitions) and references from an ordered paragraph stream, then checks
// that every reference resolves and every sequence is well ordered.

pub mod adapters;
pub mod config;
pub mod error;
pub mod extract;
pub mod report;
pub mod rules;
pub mod types;

// Re-export main types and functions for easy use
pub use types::*;
pub use adapters::{source_for_path, ParagraphSource};
pub use config::{CompiledProfile, DocumentProfile, NumberingConvention, ProfileManager, RequiredHeading};
pub use error::CheckError;
pub use report::CheckReport;
pub use rules::{check, ConsistencyEngine};
