//! Audit trail and rollback management for the Aegis pipeline.
//!
//! Every lifecycle transition produces one immutable
//! [`PromotionAuditEntry`](aegis_types::PromotionAuditEntry) in the
//! [`AuditTrail`]; the trail supports ordered filtering, aggregate reports,
//! and json/csv/markdown export.
//!
//! Rollback is a distinct two-phase object, not a mutation of the promotion:
//! the [`RollbackManager`] creates, approves/rejects, and executes
//! [`RollbackRequest`](aegis_types::RollbackRequest)s against deployed
//! promotions, running safety checks before invoking the underlying revert.

#![deny(unsafe_code)]

pub mod error;
pub mod export;
pub mod manager;
pub mod report;
pub mod revert;
pub mod trail;

pub use error::AuditError;
pub use export::ExportFormat;
pub use manager::{PromotionDirectory, RollbackConfig, RollbackManager};
pub use report::AuditReport;
pub use revert::{RevertExecutor, RevertResult, SimulatedRevert};
pub use trail::{AuditFilter, AuditTrail};
