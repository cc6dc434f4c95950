//! Promotion error types.

use aegis_types::{PromotionId, PromotionStatus};
use thiserror::Error;

/// Errors raised by the promotion lifecycle manager.
#[derive(Debug, Error)]
pub enum PromotionError {
    /// No promotion with the given id exists.
    #[error("promotion {0} not found")]
    NotFound(PromotionId),

    /// The operation is not valid from the promotion's current state.
    #[error("promotion {id} is {actual}, expected {expected}")]
    InvalidState {
        id: PromotionId,
        expected: String,
        actual: PromotionStatus,
    },

    /// Creation was refused; every violated requirement is listed.
    #[error("promotion validation failed: {}", .violations.join("; "))]
    ValidationFailed { violations: Vec<String> },

    /// An isolation boundary was violated. Always fatal to the operation.
    #[error(transparent)]
    Isolation(#[from] aegis_isolation::IsolationError),
}
