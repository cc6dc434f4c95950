//! The governance kernel: one instance of each manager, explicitly wired.

use std::sync::Arc;

use aegis_advisory::Advisor;
use aegis_audit::{
    AuditFilter, AuditReport, AuditTrail, ExportFormat, RevertExecutor, RollbackManager,
};
use aegis_consultation::ConsultationEngine;
use aegis_isolation::{ContextScope, RepositoryIsolationGuard};
use aegis_promotion::{
    ApprovalOutcome, DeployOutcome, NewPromotion, Notifier, PromotionLifecycleManager,
    PromotionStore, RepoWorkflow,
};
use aegis_risk::RiskEvaluator;
use aegis_store::RecordStore;
use aegis_types::{
    ConsultationRequest, ConsultationResponse, ConsultationTrigger, Decision, DecisionAnalysis,
    PromotionAuditEntry, PromotionId, PromotionRequest, RepositoryContext, RiskEvaluation,
    RollbackId, RollbackRequest,
};

use crate::config::GovernanceConfig;
use crate::error::KernelError;

/// The outcome of assessing a decision: its risks, the triggers that fired,
/// and the consultation request when one is required.
#[derive(Clone, Debug)]
pub struct DecisionAssessment {
    pub risks: RiskEvaluation,
    pub triggers: Vec<ConsultationTrigger>,
    /// Present exactly when `triggers` is non-empty.
    pub consultation: Option<ConsultationRequest>,
}

impl DecisionAssessment {
    /// Whether the decision may proceed without a human.
    pub fn may_proceed_unattended(&self) -> bool {
        self.triggers.is_empty()
    }
}

/// Owns one instance of every pipeline manager.
pub struct GovernanceKernel {
    guard: Arc<RepositoryIsolationGuard>,
    trail: Arc<AuditTrail>,
    risk: RiskEvaluator,
    consultation: ConsultationEngine,
    promotions: PromotionLifecycleManager,
    rollbacks: RollbackManager,
}

impl GovernanceKernel {
    /// Build a kernel from a configuration and the injected collaborators.
    pub fn new(
        config: GovernanceConfig,
        advisor: Arc<dyn Advisor>,
        store: Arc<dyn RecordStore>,
        workflow: Arc<dyn RepoWorkflow>,
        notifier: Arc<dyn Notifier>,
        revert: Arc<dyn RevertExecutor>,
    ) -> Self {
        let guard = Arc::new(RepositoryIsolationGuard::new(
            config.home_repo_id.clone(),
            &config.home_repo_path,
        ));
        let trail = Arc::new(AuditTrail::new());
        let promotion_store = PromotionStore::new();

        let risk = RiskEvaluator::new(advisor.clone());
        let consultation = ConsultationEngine::new(advisor, store.clone(), config.consultation());
        let promotions = PromotionLifecycleManager::new(
            promotion_store.clone(),
            workflow,
            notifier,
            guard.clone(),
            trail.clone(),
            config.promotion(),
        );
        let rollbacks = RollbackManager::new(
            trail.clone(),
            Arc::new(promotion_store),
            revert,
            store,
            config.rollback(),
        );

        Self {
            guard,
            trail,
            risk,
            consultation,
            promotions,
            rollbacks,
        }
    }

    /// Recover persisted state (consultation patterns, rollback requests)
    /// after a restart.
    pub async fn restore(&self) -> Result<(), KernelError> {
        let patterns = self.consultation.patterns().load().await?;
        let rollbacks = self.rollbacks.load().await?;
        tracing::info!(patterns, rollbacks, "governance state restored");
        Ok(())
    }

    // ── Repositories ───────────────────────────────────────────────────

    /// Register a repository the agent may operate in.
    pub fn register_repository(&self, repo_id: &str, root: &str) {
        self.guard.register_repository(repo_id, root);
    }

    /// Enter a repository context for the duration of the returned scope.
    pub fn enter_repository(&self, context: RepositoryContext) -> ContextScope<'_> {
        self.guard.enter(context)
    }

    /// The isolation guard.
    pub fn guard(&self) -> &RepositoryIsolationGuard {
        &self.guard
    }

    // ── Decision assessment ────────────────────────────────────────────

    /// Assess a decision: evaluate risks, fire consultation triggers, and
    /// build the consultation request when one is required.
    pub async fn assess(&self, decision: &Decision) -> DecisionAssessment {
        let risks = self.risk.evaluate(decision).await;
        let analysis = DecisionAnalysis::new().with_risks(risks.clone());
        let triggers = self.consultation.should_consult(decision, &analysis);
        let consultation = if triggers.is_empty() {
            None
        } else {
            Some(
                self.consultation
                    .build_request(decision, triggers.clone(), analysis)
                    .await,
            )
        };
        DecisionAssessment {
            risks,
            triggers,
            consultation,
        }
    }

    /// Incorporate a human's consultation response; returns the enriched
    /// decision.
    pub async fn record_consultation(
        &self,
        request: &ConsultationRequest,
        response: &ConsultationResponse,
    ) -> Decision {
        self.consultation.incorporate_feedback(request, response).await
    }

    /// The consultation engine (e.g. for direct pattern inspection).
    pub fn consultation(&self) -> &ConsultationEngine {
        &self.consultation
    }

    // ── Promotion lifecycle ────────────────────────────────────────────

    /// Submit a tested change bundle for promotion.
    pub async fn submit(
        &self,
        new: NewPromotion,
        requested_by: &str,
    ) -> Result<PromotionRequest, KernelError> {
        Ok(self.promotions.create(new, requested_by).await?)
    }

    /// Approve a pending promotion.
    pub async fn approve(
        &self,
        id: &PromotionId,
        approved_by: &str,
        reason: Option<String>,
        conditions: Vec<String>,
    ) -> Result<ApprovalOutcome, KernelError> {
        Ok(self
            .promotions
            .approve(id, approved_by, reason, conditions)
            .await?)
    }

    /// Reject a pending promotion.
    pub async fn reject(
        &self,
        id: &PromotionId,
        rejected_by: &str,
        reason: &str,
    ) -> Result<PromotionRequest, KernelError> {
        Ok(self.promotions.reject(id, rejected_by, reason).await?)
    }

    /// Deploy an approved promotion.
    pub async fn deploy(&self, id: &PromotionId) -> Result<DeployOutcome, KernelError> {
        Ok(self.promotions.deploy(id).await?)
    }

    /// Get a promotion by id.
    pub fn promotion(&self, id: &PromotionId) -> Option<PromotionRequest> {
        self.promotions.get(id)
    }

    // ── Rollback ───────────────────────────────────────────────────────

    /// Request a rollback of a deployed promotion.
    pub async fn request_rollback(
        &self,
        promotion_id: &PromotionId,
        reason: &str,
        requested_by: &str,
    ) -> Result<RollbackRequest, KernelError> {
        Ok(self
            .rollbacks
            .create_rollback_request(promotion_id, reason, requested_by)
            .await?)
    }

    /// Approve a pending rollback request.
    pub async fn approve_rollback(
        &self,
        id: &RollbackId,
        approved_by: &str,
    ) -> Result<RollbackRequest, KernelError> {
        Ok(self.rollbacks.approve_rollback_request(id, approved_by).await?)
    }

    /// Reject a pending rollback request.
    pub async fn reject_rollback(
        &self,
        id: &RollbackId,
        rejected_by: &str,
        reason: &str,
    ) -> Result<RollbackRequest, KernelError> {
        Ok(self
            .rollbacks
            .reject_rollback_request(id, rejected_by, reason)
            .await?)
    }

    // ── Audit ──────────────────────────────────────────────────────────

    /// Query the audit trail.
    pub fn audit_log(&self, filter: &AuditFilter) -> Vec<PromotionAuditEntry> {
        self.trail.log(filter)
    }

    /// Aggregate audit report.
    pub fn audit_report(&self) -> AuditReport {
        self.trail.report()
    }

    /// Export the audit trail.
    pub fn export_audit(&self, format: ExportFormat) -> Result<String, KernelError> {
        Ok(self.trail.export(format)?)
    }
}
