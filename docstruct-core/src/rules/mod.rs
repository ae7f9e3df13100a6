pub mod acronym_usage;
pub mod cross_reference;
pub mod engine;
pub mod footnote_sequence;
pub mod heading_hierarchy;

pub use acronym_usage::AcronymUsageValidator;
pub use cross_reference::CrossReferenceValidator;
pub use engine::{check, validator_by_name, ConsistencyEngine, ValidationContext, Validator};
pub use footnote_sequence::FootnoteSequenceValidator;
pub use heading_hierarchy::HeadingHierarchyValidator;
