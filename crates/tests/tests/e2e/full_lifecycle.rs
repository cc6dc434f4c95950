//! End-to-end test: a decision travels the whole pipeline.
//!
//! Assess → consult → submit → approve → deploy, with the audit trail
//! recording every transition and the state machine refusing shortcuts.

use std::sync::Arc;

use aegis_advisory::FailingAdvisor;
use aegis_audit::{AuditFilter, SimulatedRevert};
use aegis_kernel::{GovernanceConfig, GovernanceKernel};
use aegis_promotion::{NewPromotion, RecordingNotifier, SimulatedRepo};
use aegis_store::InMemoryRecordStore;
use aegis_types::{
    AuditAction, ChangeDescription, ChangeSpec, Decision, DecisionType, FileChangeType,
    ImpactAssessment, PromotionStatus, RepositoryContext, RollbackPlan, TestResults,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn kernel() -> (GovernanceKernel, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::new());
    let kernel = GovernanceKernel::new(
        GovernanceConfig::default(),
        Arc::new(FailingAdvisor),
        Arc::new(InMemoryRecordStore::new()),
        Arc::new(SimulatedRepo::succeeding()),
        notifier.clone(),
        Arc::new(SimulatedRevert::succeeding()),
    );
    kernel.register_repository("workspace", "/srv/workspace");
    (kernel, notifier)
}

fn workspace() -> RepositoryContext {
    RepositoryContext::new("workspace", "/srv/workspace")
}

fn tested_bundle() -> NewPromotion {
    NewPromotion {
        title: "Add request coalescing".into(),
        description: "Coalesces duplicate in-flight requests".into(),
        changes: vec![
            ChangeDescription::new("src/coalesce.rs", FileChangeType::Added)
                .with_lines(120, 0)
                .with_summary("new coalescing layer"),
            ChangeDescription::new("src/client.rs", FileChangeType::Modified)
                .with_lines(18, 6)
                .with_summary("route through coalescer"),
        ],
        test_results: TestResults::all_passing(34, 2100),
        impact: ImpactAssessment::low_risk().with_components(vec!["client".into()]),
        rollback_plan: RollbackPlan::git_revert(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn decision_to_deployment() {
    let (kernel, notifier) = kernel();
    let _scope = kernel.enter_repository(workspace());

    // A routine decision needs no consultation.
    let decision = Decision::new("d-100", "coalesce requests", DecisionType::Feature)
        .with_change(ChangeSpec::new(
            "additive",
            vec!["src/coalesce.rs".into(), "src/client.rs".into()],
        ));
    let assessment = kernel.assess(&decision).await;
    assert!(assessment.may_proceed_unattended());
    // A decision is never risk-free.
    assert!(!assessment.risks.risks.is_empty());

    // Work done and tested: submit, approve, deploy.
    let promotion = kernel.submit(tested_bundle(), "system").await.unwrap();
    assert_eq!(promotion.status, PromotionStatus::Pending);

    kernel
        .approve(&promotion.id, "alice", Some("low risk".into()), vec![])
        .await
        .unwrap();
    let outcome = kernel.deploy(&promotion.id).await.unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.tests_passed, Some(true));
    assert!(outcome.pr_url.is_some());

    let deployed = kernel.promotion(&promotion.id).unwrap();
    assert_eq!(deployed.status, PromotionStatus::Deployed);

    // Audit trail recorded created → approved → deployed, in order.
    let actions: Vec<AuditAction> = kernel
        .audit_log(&AuditFilter::new().for_promotion(promotion.id.clone()))
        .iter()
        .map(|e| e.action)
        .collect();
    assert_eq!(
        actions,
        vec![AuditAction::Created, AuditAction::Approved, AuditAction::Deployed]
    );

    // Notifications fired for each stage.
    assert_eq!(notifier.sent().len(), 3);
}

#[tokio::test]
async fn deployment_is_refused_without_approval() {
    let (kernel, _) = kernel();
    let _scope = kernel.enter_repository(workspace());

    let promotion = kernel.submit(tested_bundle(), "system").await.unwrap();
    assert!(kernel.deploy(&promotion.id).await.is_err());
    // The failed attempt mutated nothing.
    assert_eq!(
        kernel.promotion(&promotion.id).unwrap().status,
        PromotionStatus::Pending
    );
}

#[tokio::test]
async fn rejected_promotion_is_terminal() {
    let (kernel, _) = kernel();
    let _scope = kernel.enter_repository(workspace());

    let promotion = kernel.submit(tested_bundle(), "system").await.unwrap();
    kernel
        .reject(&promotion.id, "bob", "needs a design review")
        .await
        .unwrap();

    assert!(kernel.deploy(&promotion.id).await.is_err());
    assert!(kernel
        .approve(&promotion.id, "alice", None, vec![])
        .await
        .is_err());
    assert_eq!(
        kernel.promotion(&promotion.id).unwrap().status,
        PromotionStatus::Rejected
    );
}

#[tokio::test]
async fn failed_remote_tests_leave_promotion_approved() {
    let notifier = Arc::new(RecordingNotifier::new());
    let kernel = GovernanceKernel::new(
        GovernanceConfig::default(),
        Arc::new(FailingAdvisor),
        Arc::new(InMemoryRecordStore::new()),
        Arc::new(SimulatedRepo::tests_failing()),
        notifier,
        Arc::new(SimulatedRevert::succeeding()),
    );
    kernel.register_repository("workspace", "/srv/workspace");
    let _scope = kernel.enter_repository(workspace());

    let promotion = kernel.submit(tested_bundle(), "system").await.unwrap();
    kernel
        .approve(&promotion.id, "alice", None, vec![])
        .await
        .unwrap();

    let outcome = kernel.deploy(&promotion.id).await.unwrap();
    assert!(!outcome.success);
    assert_eq!(outcome.tests_passed, Some(false));
    assert_eq!(
        kernel.promotion(&promotion.id).unwrap().status,
        PromotionStatus::Approved
    );

    // A second attempt is the caller's decision, not automatic.
    let retry = kernel.deploy(&promotion.id).await.unwrap();
    assert!(!retry.success);
}
