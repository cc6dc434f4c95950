//! Kernel error type: the union of subsystem errors.

use thiserror::Error;

/// Errors surfaced by the governance kernel.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error(transparent)]
    Promotion(#[from] aegis_promotion::PromotionError),

    #[error(transparent)]
    Audit(#[from] aegis_audit::AuditError),

    #[error(transparent)]
    Isolation(#[from] aegis_isolation::IsolationError),

    #[error(transparent)]
    Store(#[from] aegis_store::StoreError),
}
