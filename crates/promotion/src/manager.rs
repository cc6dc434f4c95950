//! The promotion lifecycle manager.

use std::sync::Arc;

use chrono::Utc;
use aegis_audit::AuditTrail;
use aegis_isolation::{IsolationError, RepositoryIsolationGuard};
use aegis_types::{
    AuditAction, ChangeDescription, ImpactAssessment, PromotionAuditEntry, PromotionId,
    PromotionRequest, PromotionStatus, RollbackPlan, TestResults,
};

use crate::describe;
use crate::error::PromotionError;
use crate::notify::{Notification, NotificationKind, Notifier};
use crate::repo::{PullRequest, RepoWorkflow, WorkflowError};
use crate::store::PromotionStore;

/// Lifecycle configuration.
#[derive(Clone, Debug)]
pub struct PromotionConfig {
    /// Production-equivalent base branch pull requests target.
    pub production_branch: String,
    /// Prefix for generated promotion branches.
    pub branch_prefix: String,
    /// Remote test command run before deployment completes.
    pub test_command: String,
    /// Optional deploy command run after tests pass.
    pub deploy_command: Option<String>,
    /// When true, a successful approval immediately triggers deployment.
    pub auto_deploy_on_approval: bool,
}

impl Default for PromotionConfig {
    fn default() -> Self {
        Self {
            production_branch: "main".into(),
            branch_prefix: "promotion/".into(),
            test_command: "cargo test --all".into(),
            deploy_command: None,
            auto_deploy_on_approval: false,
        }
    }
}

/// Input for creating a promotion request.
#[derive(Clone, Debug)]
pub struct NewPromotion {
    pub title: String,
    pub description: String,
    pub changes: Vec<ChangeDescription>,
    pub test_results: TestResults,
    pub impact: ImpactAssessment,
    pub rollback_plan: RollbackPlan,
}

/// Result object of a deployment attempt.
///
/// Deployment failure is a reportable outcome, not a program fault: external
/// step failures land here with `success == false` and the promotion stays
/// in its pre-deployment state.
#[derive(Clone, Debug, Default)]
pub struct DeployOutcome {
    /// Whether the full pipeline completed.
    pub success: bool,
    /// Outcome of the remote test run, once it ran.
    pub tests_passed: Option<bool>,
    /// URL of the created pull request.
    pub pr_url: Option<String>,
    /// URL of the deployment.
    pub deployment_url: Option<String>,
    /// Error captured from the failing step.
    pub error: Option<String>,
    /// Step-by-step log of the pipeline.
    pub log: Vec<String>,
}

impl DeployOutcome {
    fn push_log(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
    }
}

/// Result of an approval, including the deployment when approval
/// auto-triggers it.
#[derive(Clone, Debug)]
pub struct ApprovalOutcome {
    pub promotion: PromotionRequest,
    pub deployment: Option<DeployOutcome>,
}

/// Internal classification of a failed deployment step.
enum StepError {
    Governance(IsolationError),
    Workflow(WorkflowError),
}

/// Owns the promotion state machine.
pub struct PromotionLifecycleManager {
    store: PromotionStore,
    workflow: Arc<dyn RepoWorkflow>,
    notifier: Arc<dyn Notifier>,
    guard: Arc<RepositoryIsolationGuard>,
    trail: Arc<AuditTrail>,
    config: PromotionConfig,
}

impl PromotionLifecycleManager {
    pub fn new(
        store: PromotionStore,
        workflow: Arc<dyn RepoWorkflow>,
        notifier: Arc<dyn Notifier>,
        guard: Arc<RepositoryIsolationGuard>,
        trail: Arc<AuditTrail>,
        config: PromotionConfig,
    ) -> Self {
        Self {
            store,
            workflow,
            notifier,
            guard,
            trail,
            config,
        }
    }

    /// The underlying store (e.g. for wiring the rollback directory).
    pub fn store(&self) -> &PromotionStore {
        &self.store
    }

    /// Create a promotion request.
    ///
    /// Validation collects every violation, not just the first: non-empty
    /// changes, a passing test run, an impact assessment naming affected
    /// components, and a rollback plan with steps.
    pub async fn create(
        &self,
        new: NewPromotion,
        requested_by: &str,
    ) -> Result<PromotionRequest, PromotionError> {
        let mut violations = Vec::new();
        if new.changes.is_empty() {
            violations.push("changes: at least one change description is required".to_string());
        }
        if !new.test_results.passed {
            violations.push(format!(
                "test_results: a promotion requires a passing test run ({} failing)",
                new.test_results.failed_tests,
            ));
        }
        if new.impact.affected_components.is_empty() {
            violations
                .push("impact: assessment must name at least one affected component".to_string());
        }
        if new.rollback_plan.steps.is_empty() {
            violations.push("rollback_plan: at least one rollback step is required".to_string());
        }
        if !violations.is_empty() {
            return Err(PromotionError::ValidationFailed { violations });
        }

        let promotion = PromotionRequest {
            id: PromotionId::new(),
            title: new.title,
            description: new.description,
            status: PromotionStatus::Pending,
            created_at: Utc::now(),
            changes: new.changes,
            test_results: new.test_results,
            impact: new.impact,
            rollback_plan: new.rollback_plan,
            approved_by: None,
            approved_at: None,
        };
        self.store.insert(promotion.clone());
        self.trail.record(PromotionAuditEntry::new(
            promotion.id.clone(),
            AuditAction::Created,
            requested_by,
        ));
        self.send(
            Notification::new(
                NotificationKind::ApprovalRequested,
                promotion.id.clone(),
                promotion.title.clone(),
            )
            .with_status(promotion.status.to_string()),
        )
        .await;
        Ok(promotion)
    }

    /// Approve a pending promotion. With `auto_deploy_on_approval` set,
    /// deployment follows within the same call.
    pub async fn approve(
        &self,
        id: &PromotionId,
        approved_by: &str,
        reason: Option<String>,
        conditions: Vec<String>,
    ) -> Result<ApprovalOutcome, PromotionError> {
        let promotion = self.expect_status(id, PromotionStatus::Pending, "pending")?;

        let approved = self
            .store
            .update(id, |p| {
                p.status = PromotionStatus::Approved;
                p.approved_by = Some(approved_by.to_string());
                p.approved_at = Some(Utc::now());
            })
            .ok_or_else(|| PromotionError::NotFound(id.clone()))?;

        let mut audit_reason = reason.unwrap_or_default();
        if !conditions.is_empty() {
            if !audit_reason.is_empty() {
                audit_reason.push_str("; ");
            }
            audit_reason.push_str(&format!("conditions: {}", conditions.join("; ")));
        }
        let mut entry =
            PromotionAuditEntry::new(id.clone(), AuditAction::Approved, approved_by);
        if !audit_reason.is_empty() {
            entry = entry.with_reason(audit_reason);
        }
        self.trail.record(entry);

        self.send(
            Notification::new(NotificationKind::Approved, id.clone(), promotion.title.clone())
                .with_approver(approved_by)
                .with_status(approved.status.to_string()),
        )
        .await;

        let deployment = if self.config.auto_deploy_on_approval {
            Some(self.deploy(id).await?)
        } else {
            None
        };

        Ok(ApprovalOutcome {
            promotion: self.store.get(id).unwrap_or(approved),
            deployment,
        })
    }

    /// Reject a pending promotion. Terminal.
    pub async fn reject(
        &self,
        id: &PromotionId,
        rejected_by: &str,
        reason: &str,
    ) -> Result<PromotionRequest, PromotionError> {
        let promotion = self.expect_status(id, PromotionStatus::Pending, "pending")?;

        let rejected = self
            .store
            .update(id, |p| p.status = PromotionStatus::Rejected)
            .ok_or_else(|| PromotionError::NotFound(id.clone()))?;
        self.trail.record(
            PromotionAuditEntry::new(id.clone(), AuditAction::Rejected, rejected_by)
                .with_reason(reason),
        );
        self.send(
            Notification::new(NotificationKind::Rejected, id.clone(), promotion.title)
                .with_approver(rejected_by)
                .with_status(rejected.status.to_string()),
        )
        .await;
        Ok(rejected)
    }

    /// Deploy an approved promotion.
    ///
    /// Sequence, each step logged: isolation assert, pull request on the
    /// production repository, remote test run, optional deploy command,
    /// terminal `deployed` mark. A failing test run halts the deployment
    /// without retry. Governance violations surface as errors; every other
    /// step failure is captured into the outcome.
    pub async fn deploy(&self, id: &PromotionId) -> Result<DeployOutcome, PromotionError> {
        let promotion = self.expect_status(id, PromotionStatus::Approved, "approved")?;
        let mut outcome = DeployOutcome::default();

        // Pull request on the production repository; never a direct write.
        let pr = match self.open_pull_request(&promotion, &mut outcome).await {
            Ok(pr) => pr,
            Err(StepError::Governance(e)) => {
                self.trail.record(
                    PromotionAuditEntry::new(id.clone(), AuditAction::DeploymentFailed, "system")
                        .with_reason(e.to_string()),
                );
                return Err(e.into());
            }
            Err(StepError::Workflow(e)) => {
                return Ok(self.fail_deployment(&promotion, outcome, e.to_string()).await);
            }
        };
        outcome.pr_url = Some(pr.url.clone());

        // Cross-check against the remote; informational only.
        if let Ok(files) = self
            .workflow
            .changed_files(&self.config.production_branch)
            .await
        {
            outcome.push_log(format!(
                "{} file(s) changed relative to {}",
                files.len(),
                self.config.production_branch,
            ));
        }

        // Remote test run. A failure halts; no automatic retry.
        match self.workflow.run_tests(&self.config.test_command).await {
            Ok(run) if run.passed => {
                outcome.tests_passed = Some(true);
                outcome.push_log(format!("remote tests passed: {}", run.output));
            }
            Ok(run) => {
                outcome.tests_passed = Some(false);
                outcome.push_log(format!("remote tests failed: {}", run.output));
                return Ok(self
                    .fail_deployment(&promotion, outcome, "remote test run failed".to_string())
                    .await);
            }
            Err(e) => {
                return Ok(self.fail_deployment(&promotion, outcome, e.to_string()).await);
            }
        }

        // Optional deploy command.
        if let Some(command) = &self.config.deploy_command {
            match self.workflow.run_deploy(command).await {
                Ok(run) if run.success => {
                    outcome.push_log(format!("deploy command succeeded: {}", run.output));
                }
                Ok(run) => {
                    return Ok(self.fail_deployment(&promotion, outcome, run.output).await);
                }
                Err(e) => {
                    return Ok(self.fail_deployment(&promotion, outcome, e.to_string()).await);
                }
            }
        }

        // Terminal mark: only after every preceding step succeeded.
        let deployed = self
            .store
            .update(id, |p| p.status = PromotionStatus::Deployed)
            .ok_or_else(|| PromotionError::NotFound(id.clone()))?;
        self.trail.record(PromotionAuditEntry::new(
            id.clone(),
            AuditAction::Deployed,
            "system",
        ));
        outcome.success = true;
        outcome.deployment_url = Some(pr.url.clone());
        outcome.push_log(format!("promotion {} deployed", id));
        tracing::info!(promotion = %id, url = %pr.url, "promotion deployed");

        self.send(
            Notification::new(NotificationKind::Deployed, id.clone(), deployed.title)
                .with_status(deployed.status.to_string())
                .with_url(pr.url),
        )
        .await;
        Ok(outcome)
    }

    /// Get a promotion by id.
    pub fn get(&self, id: &PromotionId) -> Option<PromotionRequest> {
        self.store.get(id)
    }

    /// Branch, commit, push, and pull request — the isolation guard is
    /// asserted immediately before each write.
    async fn open_pull_request(
        &self,
        promotion: &PromotionRequest,
        outcome: &mut DeployOutcome,
    ) -> Result<PullRequest, StepError> {
        let branch = format!("{}{}", self.config.branch_prefix, promotion.id);
        let description = describe::pr_description(promotion);

        self.guard
            .assert_home_repo_untouched()
            .map_err(StepError::Governance)?;
        self.workflow
            .create_branch(&branch, &self.config.production_branch)
            .await
            .map_err(StepError::Workflow)?;
        outcome.push_log(format!("created branch {}", branch));

        self.guard
            .assert_home_repo_untouched()
            .map_err(StepError::Governance)?;
        self.workflow
            .commit(&branch, &promotion.title)
            .await
            .map_err(StepError::Workflow)?;
        outcome.push_log("committed changes".to_string());

        self.guard
            .assert_home_repo_untouched()
            .map_err(StepError::Governance)?;
        self.workflow
            .push(&branch)
            .await
            .map_err(StepError::Workflow)?;
        outcome.push_log(format!("pushed branch {}", branch));

        let pr = self
            .workflow
            .create_pull_request(
                &branch,
                &promotion.title,
                &description,
                &self.config.production_branch,
            )
            .await
            .map_err(StepError::Workflow)?;
        outcome.push_log(format!("opened pull request {}", pr.url));
        Ok(pr)
    }

    async fn fail_deployment(
        &self,
        promotion: &PromotionRequest,
        mut outcome: DeployOutcome,
        error: String,
    ) -> DeployOutcome {
        tracing::error!(promotion = %promotion.id, error = %error, "deployment failed");
        outcome.success = false;
        outcome.error = Some(error.clone());
        outcome.push_log(format!("deployment halted: {}", error));
        self.trail.record(
            PromotionAuditEntry::new(
                promotion.id.clone(),
                AuditAction::DeploymentFailed,
                "system",
            )
            .with_reason(error),
        );
        self.send(
            Notification::new(
                NotificationKind::DeploymentFailed,
                promotion.id.clone(),
                promotion.title.clone(),
            )
            .with_status(promotion.status.to_string()),
        )
        .await;
        outcome
    }

    fn expect_status(
        &self,
        id: &PromotionId,
        expected: PromotionStatus,
        expected_name: &str,
    ) -> Result<PromotionRequest, PromotionError> {
        let promotion = self
            .store
            .get(id)
            .ok_or_else(|| PromotionError::NotFound(id.clone()))?;
        if promotion.status != expected {
            return Err(PromotionError::InvalidState {
                id: id.clone(),
                expected: expected_name.to_string(),
                actual: promotion.status,
            });
        }
        Ok(promotion)
    }

    /// Fire-and-forget notification delivery; failures are logged, never
    /// propagated.
    async fn send(&self, notification: Notification) {
        if let Err(e) = self.notifier.notify(notification).await {
            tracing::warn!(error = %e, "notification delivery failed");
        }
    }
}
