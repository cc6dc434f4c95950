//! Adversarial test: malformed promotions cannot enter the lifecycle.
//!
//! A promotion with failing tests is refused no matter how complete the
//! rest of the request looks, and validation reports every violation.

use std::sync::Arc;

use aegis_advisory::FailingAdvisor;
use aegis_audit::SimulatedRevert;
use aegis_kernel::{GovernanceConfig, GovernanceKernel};
use aegis_promotion::{NewPromotion, RecordingNotifier, SimulatedRepo};
use aegis_store::InMemoryRecordStore;
use aegis_types::{
    ChangeDescription, FileChangeType, ImpactAssessment, ImpactRisk, RollbackPlan, TestFailure,
    TestResults,
};

fn kernel() -> GovernanceKernel {
    let kernel = GovernanceKernel::new(
        GovernanceConfig::default(),
        Arc::new(FailingAdvisor),
        Arc::new(InMemoryRecordStore::new()),
        Arc::new(SimulatedRepo::succeeding()),
        Arc::new(RecordingNotifier::new()),
        Arc::new(SimulatedRevert::succeeding()),
    );
    kernel.register_repository("workspace", "/srv/workspace");
    kernel
}

fn otherwise_perfect_bundle(test_results: TestResults) -> NewPromotion {
    NewPromotion {
        title: "Polished change".into(),
        description: "Impeccable except for the tests".into(),
        changes: vec![
            ChangeDescription::new("src/a.rs", FileChangeType::Modified)
                .with_lines(10, 2)
                .with_summary("well described"),
        ],
        test_results,
        impact: ImpactAssessment::low_risk()
            .with_risk(ImpactRisk::Low)
            .with_components(vec!["core".into()]),
        rollback_plan: RollbackPlan::git_revert(),
    }
}

#[tokio::test]
async fn failing_tests_always_fail_validation() {
    let kernel = kernel();
    let results = TestResults::with_failures(
        50,
        vec![TestFailure {
            name: "test_replay".into(),
            message: "expected 3, got 2".into(),
        }],
        4000,
    );

    let err = kernel
        .submit(otherwise_perfect_bundle(results), "system")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("passing test run"));
}

#[tokio::test]
async fn every_violation_is_reported_at_once() {
    let kernel = kernel();
    let new = NewPromotion {
        title: "empty".into(),
        description: "d".into(),
        changes: vec![],
        test_results: TestResults::with_failures(1, vec![], 10),
        impact: ImpactAssessment::low_risk(), // no components
        rollback_plan: RollbackPlan {
            steps: vec![],
            estimated_time_mins: 0,
            data_backup_required: false,
            automatable: false,
        },
    };

    let err = kernel.submit(new, "system").await.unwrap_err();
    let message = err.to_string();
    for expected in [
        "at least one change",
        "passing test run",
        "affected component",
        "rollback step",
    ] {
        assert!(message.contains(expected), "missing violation: {}", expected);
    }
}

#[tokio::test]
async fn zero_failures_but_failed_flag_is_still_refused() {
    // An inconsistent result (passed=false with an empty failure list)
    // still cannot enter the lifecycle.
    let kernel = kernel();
    let results = TestResults::with_failures(10, vec![], 100);
    assert!(kernel
        .submit(otherwise_perfect_bundle(results), "system")
        .await
        .is_err());
}
