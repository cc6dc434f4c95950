//! Adversarial test: the home repository cannot be written directly.
//!
//! Deployments attempted from the home-repository context, under renamed or
//! re-cased spellings of the home path, or with no context at all must be
//! refused before any write reaches the repository workflow.

use std::sync::Arc;

use aegis_advisory::FailingAdvisor;
use aegis_audit::{AuditFilter, SimulatedRevert};
use aegis_isolation::IsolationError;
use aegis_kernel::{GovernanceConfig, GovernanceKernel};
use aegis_promotion::{NewPromotion, RecordingNotifier, SimulatedRepo};
use aegis_store::InMemoryRecordStore;
use aegis_types::{
    AuditAction, ChangeDescription, FileChangeType, ImpactAssessment, PromotionStatus,
    RepositoryContext, RollbackPlan, TestResults,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn fixture() -> (GovernanceKernel, Arc<SimulatedRepo>) {
    let repo = Arc::new(SimulatedRepo::succeeding());
    let kernel = GovernanceKernel::new(
        GovernanceConfig::default(),
        Arc::new(FailingAdvisor),
        Arc::new(InMemoryRecordStore::new()),
        repo.clone(),
        Arc::new(RecordingNotifier::new()),
        Arc::new(SimulatedRevert::succeeding()),
    );
    kernel.register_repository("workspace", "/srv/workspace");
    (kernel, repo)
}

fn bundle() -> NewPromotion {
    NewPromotion {
        title: "t".into(),
        description: "d".into(),
        changes: vec![
            ChangeDescription::new("src/a.rs", FileChangeType::Modified).with_lines(3, 1),
        ],
        test_results: TestResults::all_passing(5, 200),
        impact: ImpactAssessment::low_risk().with_components(vec!["core".into()]),
        rollback_plan: RollbackPlan::git_revert(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn deploy_from_home_context_is_refused_before_any_write() {
    let (kernel, repo) = fixture();
    let _scope =
        kernel.enter_repository(RepositoryContext::new("agent-home", "/srv/agent"));

    let promotion = kernel.submit(bundle(), "system").await.unwrap();
    kernel
        .approve(&promotion.id, "alice", None, vec![])
        .await
        .unwrap();

    assert!(kernel.deploy(&promotion.id).await.is_err());
    // The workflow never saw a write.
    assert!(repo.operations().is_empty());
    // The promotion stayed approved and the refusal was audited.
    assert_eq!(
        kernel.promotion(&promotion.id).unwrap().status,
        PromotionStatus::Approved
    );
    assert!(kernel
        .audit_log(&AuditFilter::new())
        .iter()
        .any(|e| e.action == AuditAction::DeploymentFailed));
}

#[tokio::test]
async fn recased_home_path_cannot_bypass_the_guard() {
    let (kernel, repo) = fixture();
    // Same location, hostile spelling.
    let _scope =
        kernel.enter_repository(RepositoryContext::new("innocent-name", "\\Srv\\AGENT\\"));

    let promotion = kernel.submit(bundle(), "system").await.unwrap();
    kernel
        .approve(&promotion.id, "alice", None, vec![])
        .await
        .unwrap();

    assert!(kernel.deploy(&promotion.id).await.is_err());
    assert!(repo.operations().is_empty());
}

#[tokio::test]
async fn deploy_with_no_context_is_refused() {
    let (kernel, repo) = fixture();
    let promotion = kernel.submit(bundle(), "system").await.unwrap();
    kernel
        .approve(&promotion.id, "alice", None, vec![])
        .await
        .unwrap();

    assert!(kernel.deploy(&promotion.id).await.is_err());
    assert!(repo.operations().is_empty());
}

#[tokio::test]
async fn guard_check_runs_again_after_context_changes_mid_pipeline() {
    // A nested scope that ends before deployment must not leave a stale
    // allowance behind.
    let (kernel, repo) = fixture();
    let promotion = kernel.submit(bundle(), "system").await.unwrap();
    kernel
        .approve(&promotion.id, "alice", None, vec![])
        .await
        .unwrap();

    {
        let _workspace =
            kernel.enter_repository(RepositoryContext::new("workspace", "/srv/workspace"));
        // Scope dropped here without deploying.
    }

    match kernel.guard().require_context() {
        Err(IsolationError::NoActiveContext) => {}
        other => panic!("expected empty context stack, got {other:?}"),
    }
    assert!(kernel.deploy(&promotion.id).await.is_err());
    assert!(repo.operations().is_empty());
}
