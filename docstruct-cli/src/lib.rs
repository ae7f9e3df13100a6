// All checking lives in docstruct-core
// This CLI wraps it with input selection and the JSON report envelope

pub mod envelope;
pub mod logging;

// Re-export core types for convenience
pub use docstruct_core::*;

pub use envelope::ReportEnvelope;
pub use logging::log_filter;
