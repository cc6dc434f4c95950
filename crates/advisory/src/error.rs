//! Advisory error types.

use thiserror::Error;

/// Errors that can occur when querying the advisory backend.
///
/// These never propagate out of the pipeline: every caller substitutes a
/// documented heuristic fallback.
#[derive(Debug, Error)]
pub enum AdvisoryError {
    /// The backend could not be reached or timed out.
    #[error("advisory backend unavailable: {0}")]
    Unavailable(String),

    /// The backend returned a response the caller could not use at all.
    #[error("advisory response unusable: {0}")]
    Unusable(String),
}
