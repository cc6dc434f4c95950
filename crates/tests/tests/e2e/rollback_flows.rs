//! End-to-end test: governed reversal of deployed promotions.

use std::sync::Arc;

use aegis_advisory::FailingAdvisor;
use aegis_audit::{AuditFilter, SimulatedRevert};
use aegis_kernel::{GovernanceConfig, GovernanceKernel};
use aegis_promotion::{NewPromotion, RecordingNotifier, SimulatedRepo};
use aegis_store::InMemoryRecordStore;
use aegis_types::{
    AuditAction, ChangeDescription, FileChangeType, ImpactAssessment, PromotionId,
    PromotionStatus, RepositoryContext, RollbackPlan, RollbackStatus, TestResults,
};

fn kernel(require_rollback_approval: bool, revert: SimulatedRevert) -> GovernanceKernel {
    let config = GovernanceConfig {
        require_rollback_approval,
        ..GovernanceConfig::default()
    };
    let kernel = GovernanceKernel::new(
        config,
        Arc::new(FailingAdvisor),
        Arc::new(InMemoryRecordStore::new()),
        Arc::new(SimulatedRepo::succeeding()),
        Arc::new(RecordingNotifier::new()),
        Arc::new(revert),
    );
    kernel.register_repository("workspace", "/srv/workspace");
    kernel
}

async fn deployed_promotion(kernel: &GovernanceKernel) -> PromotionId {
    let _scope = kernel.enter_repository(RepositoryContext::new("workspace", "/srv/workspace"));
    let promotion = kernel
        .submit(
            NewPromotion {
                title: "Swap allocator".into(),
                description: "Replaces the arena allocator".into(),
                changes: vec![
                    ChangeDescription::new("src/alloc.rs", FileChangeType::Modified)
                        .with_lines(60, 40),
                ],
                test_results: TestResults::all_passing(20, 1500),
                impact: ImpactAssessment::low_risk().with_components(vec!["runtime".into()]),
                rollback_plan: RollbackPlan::git_revert(),
            },
            "system",
        )
        .await
        .unwrap();
    kernel
        .approve(&promotion.id, "alice", None, vec![])
        .await
        .unwrap();
    assert!(kernel.deploy(&promotion.id).await.unwrap().success);
    promotion.id
}

#[tokio::test]
async fn approval_gated_rollback() {
    let kernel = kernel(true, SimulatedRevert::succeeding());
    let promotion_id = deployed_promotion(&kernel).await;

    let request = kernel
        .request_rollback(&promotion_id, "p99 latency regression", "bob")
        .await
        .unwrap();
    assert_eq!(request.status, RollbackStatus::Pending);

    let completed = kernel.approve_rollback(&request.id, "carol").await.unwrap();
    assert_eq!(completed.status, RollbackStatus::Completed);
    assert_eq!(completed.approved_by.as_deref(), Some("carol"));

    // The promotion's own status is untouched: reversal lives in the
    // rollback request and the audit trail.
    assert_eq!(
        kernel.promotion(&promotion_id).unwrap().status,
        PromotionStatus::Deployed
    );
    assert!(kernel
        .audit_log(&AuditFilter::new().with_action(AuditAction::RolledBack))
        .iter()
        .any(|e| e.promotion_id == promotion_id));
}

#[tokio::test]
async fn rejected_rollback_executes_nothing() {
    let kernel = kernel(true, SimulatedRevert::succeeding());
    let promotion_id = deployed_promotion(&kernel).await;

    let request = kernel
        .request_rollback(&promotion_id, "false alarm", "bob")
        .await
        .unwrap();
    let rejected = kernel
        .reject_rollback(&request.id, "carol", "metrics recovered")
        .await
        .unwrap();
    assert_eq!(rejected.status, RollbackStatus::Rejected);

    let log = kernel.audit_log(&AuditFilter::new());
    assert!(log.iter().any(|e| e.action == AuditAction::RollbackRejected));
    assert!(log.iter().all(|e| e.action != AuditAction::RolledBack));
}

#[tokio::test]
async fn auto_rollback_completes_in_one_call() {
    let kernel = kernel(false, SimulatedRevert::succeeding());
    let promotion_id = deployed_promotion(&kernel).await;

    let request = kernel
        .request_rollback(&promotion_id, "bad deploy", "bob")
        .await
        .unwrap();
    assert_eq!(request.status, RollbackStatus::Completed);

    // Exactly one rolled_back entry.
    let rolled_back = kernel.audit_log(&AuditFilter::new().with_action(AuditAction::RolledBack));
    assert_eq!(rolled_back.len(), 1);
}

#[tokio::test]
async fn failed_revert_is_reported_not_thrown() {
    let kernel = kernel(false, SimulatedRevert::failing());
    let promotion_id = deployed_promotion(&kernel).await;

    let request = kernel
        .request_rollback(&promotion_id, "bad deploy", "bob")
        .await
        .unwrap();
    assert_eq!(request.status, RollbackStatus::Failed);
    assert!(request.error.is_some());
    assert!(kernel
        .audit_log(&AuditFilter::new())
        .iter()
        .any(|e| e.action == AuditAction::RollbackFailed));
}

#[tokio::test]
async fn pending_promotion_cannot_be_rolled_back() {
    let kernel = kernel(false, SimulatedRevert::succeeding());
    let _scope = kernel.enter_repository(RepositoryContext::new("workspace", "/srv/workspace"));
    let promotion = kernel
        .submit(
            NewPromotion {
                title: "t".into(),
                description: "d".into(),
                changes: vec![
                    ChangeDescription::new("src/a.rs", FileChangeType::Modified).with_lines(1, 1),
                ],
                test_results: TestResults::all_passing(1, 10),
                impact: ImpactAssessment::low_risk().with_components(vec!["core".into()]),
                rollback_plan: RollbackPlan::git_revert(),
            },
            "system",
        )
        .await
        .unwrap();

    assert!(kernel
        .request_rollback(&promotion.id, "r", "bob")
        .await
        .is_err());
}
