//! Audit entries and rollback requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{PromotionId, RollbackId};

/// A lifecycle action recorded in the audit trail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Created,
    Approved,
    Rejected,
    Deployed,
    DeploymentFailed,
    RollbackRequested,
    RollbackRejected,
    RolledBack,
    RollbackFailed,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Created => "created",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Deployed => "deployed",
            Self::DeploymentFailed => "deployment_failed",
            Self::RollbackRequested => "rollback_requested",
            Self::RollbackRejected => "rollback_rejected",
            Self::RolledBack => "rolled_back",
            Self::RollbackFailed => "rollback_failed",
        };
        write!(f, "{}", s)
    }
}

/// One immutable record of a lifecycle transition.
///
/// Entries are append-only: never mutated, never deleted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PromotionAuditEntry {
    /// The promotion this entry belongs to.
    pub promotion_id: PromotionId,
    /// The recorded action.
    pub action: AuditAction,
    /// When the action happened.
    pub timestamp: DateTime<Utc>,
    /// Who performed the action ("system" for automated steps).
    pub user: String,
    /// Reason, where one was given.
    pub reason: Option<String>,
}

impl PromotionAuditEntry {
    pub fn new(promotion_id: PromotionId, action: AuditAction, user: impl Into<String>) -> Self {
        Self {
            promotion_id,
            action,
            timestamp: Utc::now(),
            user: user.into(),
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Lifecycle state of a rollback request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RollbackStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
    Failed,
}

impl RollbackStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for RollbackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// A request to reverse a deployed promotion.
///
/// Distinct from the promotion itself: a completed rollback never rewrites
/// the promotion's `Deployed` status.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RollbackRequest {
    /// Unique identifier.
    pub id: RollbackId,
    /// The deployed promotion to reverse.
    pub promotion_id: PromotionId,
    /// Why the rollback was requested.
    pub reason: String,
    /// Who requested it.
    pub requested_by: String,
    /// When it was requested.
    pub requested_at: DateTime<Utc>,
    /// Current state.
    pub status: RollbackStatus,
    /// Who approved it, once approved.
    pub approved_by: Option<String>,
    /// When it was approved.
    pub approved_at: Option<DateTime<Utc>>,
    /// When execution finished.
    pub completed_at: Option<DateTime<Utc>>,
    /// Error captured on failure.
    pub error: Option<String>,
}

impl RollbackRequest {
    pub fn new(
        promotion_id: PromotionId,
        reason: impl Into<String>,
        requested_by: impl Into<String>,
    ) -> Self {
        Self {
            id: RollbackId::new(),
            promotion_id,
            reason: reason.into(),
            requested_by: requested_by.into(),
            requested_at: Utc::now(),
            status: RollbackStatus::Pending,
            approved_by: None,
            approved_at: None,
            completed_at: None,
            error: None,
        }
    }
}
