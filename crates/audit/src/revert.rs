//! Revert executor — trait and simulated implementation.
//!
//! Real implementations revert commits, restore previous deployments, or
//! switch traffic back, following the promotion's rollback plan.

use async_trait::async_trait;
use aegis_types::PromotionRequest;

use crate::error::AuditError;

/// Result of executing a revert.
#[derive(Clone, Debug)]
pub struct RevertResult {
    /// Whether the revert succeeded.
    pub success: bool,
    /// Rollback plan steps executed.
    pub steps_executed: usize,
    /// Total rollback plan steps.
    pub total_steps: usize,
    /// Output/log message.
    pub output: String,
}

/// Trait for executing the underlying revert of a deployed promotion.
#[async_trait]
pub trait RevertExecutor: Send + Sync {
    /// Execute the promotion's rollback plan.
    async fn revert(&self, promotion: &PromotionRequest) -> Result<RevertResult, AuditError>;

    /// Name of this executor for logging.
    fn name(&self) -> &str;
}

/// A simulated revert executor for testing.
pub struct SimulatedRevert {
    should_succeed: bool,
}

impl SimulatedRevert {
    pub fn succeeding() -> Self {
        Self {
            should_succeed: true,
        }
    }

    pub fn failing() -> Self {
        Self {
            should_succeed: false,
        }
    }
}

#[async_trait]
impl RevertExecutor for SimulatedRevert {
    async fn revert(&self, promotion: &PromotionRequest) -> Result<RevertResult, AuditError> {
        let total_steps = promotion.rollback_plan.steps.len();
        let steps_executed = if self.should_succeed { total_steps } else { 0 };
        Ok(RevertResult {
            success: self.should_succeed,
            steps_executed,
            total_steps,
            output: if self.should_succeed {
                format!("Reverted promotion {} in {} steps", promotion.id, total_steps)
            } else {
                "Simulated revert failure".into()
            },
        })
    }

    fn name(&self) -> &str {
        "simulated-revert"
    }
}
