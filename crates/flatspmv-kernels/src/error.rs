//! Error types for the flat SpMV pipeline

/// Result type for SpMV calls
pub type SpmvResult<T> = Result<T, SpmvError>;

/// Failures reported by the orchestrator.
///
/// Malformed matrices are not detected here; shape mismatches panic.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SpmvError {
    #[error("Out of memory: could not reserve carry buffer of {requested} entries")]
    CarryAlloc { requested: usize },

    #[error("Invalid launch configuration: {reason}")]
    InvalidConfig { reason: &'static str },
}
