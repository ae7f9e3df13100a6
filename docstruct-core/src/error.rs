use thiserror::Error;

/// Errors that abort a check outright.
///
/// Rule violations are never errors; they come back as `Finding`s.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("paragraph stream is not ordered: record {position} has index {found} after index {previous}")]
    UnorderedInput {
        position: usize,
        previous: usize,
        found: usize,
    },

    #[error("invalid {list} pattern '{pattern}': {source}")]
    InvalidPattern {
        list: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

pub type CheckResult<T> = std::result::Result<T, CheckError>;
