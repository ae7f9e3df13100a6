//! Paragraph stream adapters
//!
//! The engine accepts exactly one input shape, an ordered `ParagraphRecord`
//! sequence. Each adapter turns one upstream source into that shape.
//!
//! ## Architecture
//!
//! ```text
//! Source (JSON export, WordprocessingML body, plain text)
//!     ↓
//! [Format-specific ParagraphSource]
//!     ↓
//! Vec<ParagraphRecord>
//!     ↓
//! [ConsistencyEngine]
//!     ↓
//! Vec<Finding>
//! ```

pub mod json;
pub mod source;
pub mod text;
pub mod wordml;

pub use json::JsonParagraphSource;
pub use source::{source_for_path, ParagraphSource};
pub use text::PlainTextSource;
pub use wordml::WordMlSource;
