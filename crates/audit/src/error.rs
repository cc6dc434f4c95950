//! Audit and rollback error types.

use aegis_types::{PromotionId, PromotionStatus, RollbackId, RollbackStatus};
use thiserror::Error;

/// Errors raised by the audit/rollback subsystem.
#[derive(Debug, Error)]
pub enum AuditError {
    /// No promotion with the given id exists.
    #[error("promotion {0} not found")]
    PromotionNotFound(PromotionId),

    /// Only deployed promotions are rollback-eligible.
    #[error("promotion {id} is {status}, not deployed; only deployed promotions can be rolled back")]
    NotDeployed {
        id: PromotionId,
        status: PromotionStatus,
    },

    /// No rollback request with the given id exists.
    #[error("rollback request {0} not found")]
    RollbackNotFound(RollbackId),

    /// The rollback request is not in the state the operation requires.
    #[error("rollback request {id} is {actual}, expected {expected}")]
    InvalidState {
        id: RollbackId,
        expected: String,
        actual: RollbackStatus,
    },

    /// The requested export format is not supported.
    #[error("unsupported export format: {0}")]
    UnsupportedFormat(String),

    /// Export rendering failed.
    #[error("audit export failed: {0}")]
    Export(String),

    /// The persistence backend failed.
    #[error(transparent)]
    Store(#[from] aegis_store::StoreError),
}
