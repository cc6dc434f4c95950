//! End-to-end test: audit querying, reporting, and export round-trips.

use std::sync::Arc;

use aegis_advisory::FailingAdvisor;
use aegis_audit::{AuditFilter, ExportFormat, SimulatedRevert};
use aegis_kernel::{GovernanceConfig, GovernanceKernel};
use aegis_promotion::{NewPromotion, RecordingNotifier, SimulatedRepo};
use aegis_store::InMemoryRecordStore;
use aegis_types::{
    AuditAction, ChangeDescription, FileChangeType, ImpactAssessment, PromotionAuditEntry,
    RepositoryContext, RollbackPlan, TestResults,
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

fn bundle(title: &str) -> NewPromotion {
    NewPromotion {
        title: title.into(),
        description: "d".into(),
        changes: vec![
            ChangeDescription::new("src/a.rs", FileChangeType::Modified).with_lines(5, 2),
        ],
        test_results: TestResults::all_passing(8, 300),
        impact: ImpactAssessment::low_risk().with_components(vec!["core".into()]),
        rollback_plan: RollbackPlan::git_revert(),
    }
}

async fn populate(kernel: &GovernanceKernel) {
    let _scope = kernel.enter_repository(RepositoryContext::new("workspace", "/srv/workspace"));
    for (i, approve) in [true, false, true].iter().enumerate() {
        let promotion = kernel
            .submit(bundle(&format!("change {}", i)), "system")
            .await
            .unwrap();
        if *approve {
            kernel
                .approve(&promotion.id, "alice", None, vec![])
                .await
                .unwrap();
            kernel.deploy(&promotion.id).await.unwrap();
        } else {
            kernel
                .reject(&promotion.id, "bob", "not needed")
                .await
                .unwrap();
        }
    }
}

#[tokio::test]
async fn json_export_round_trips_exactly() {
    let kernel = kernel();
    populate(&kernel).await;

    let before = kernel.audit_log(&AuditFilter::new());
    let json = kernel.export_audit(ExportFormat::Json).unwrap();
    let restored: Vec<PromotionAuditEntry> = serde_json::from_str(&json).unwrap();

    let triples: Vec<_> = before
        .iter()
        .map(|e| (e.promotion_id.clone(), e.action, e.timestamp))
        .collect();
    let restored_triples: Vec<_> = restored
        .iter()
        .map(|e| (e.promotion_id.clone(), e.action, e.timestamp))
        .collect();
    assert_eq!(triples, restored_triples);
}

#[tokio::test]
async fn csv_and_markdown_exports_cover_every_entry() {
    let kernel = kernel();
    populate(&kernel).await;
    let total = kernel.audit_log(&AuditFilter::new()).len();

    let csv = kernel.export_audit(ExportFormat::Csv).unwrap();
    assert_eq!(csv.lines().count(), total + 1); // header + rows
    assert!(csv.starts_with("Timestamp,Promotion ID,Action,User,Reason"));

    let md = kernel.export_audit(ExportFormat::Markdown).unwrap();
    // Title, header row, separator, then one row per entry.
    assert_eq!(md.lines().filter(|l| l.starts_with("| ")).count() - 1, total);
}

#[tokio::test]
async fn unsupported_format_fails_with_no_output() {
    assert!(ExportFormat::parse("xml").is_err());
    assert!(ExportFormat::parse("yaml").is_err());
}

#[tokio::test]
async fn report_counts_match_the_log() {
    let kernel = kernel();
    populate(&kernel).await;

    let report = kernel.audit_report();
    assert_eq!(report.total_entries, kernel.audit_log(&AuditFilter::new()).len());
    assert_eq!(report.by_action["created"], 3);
    assert_eq!(report.by_action["approved"], 2);
    assert_eq!(report.by_action["rejected"], 1);
    assert_eq!(report.by_action["deployed"], 2);
    assert_eq!(report.by_user["alice"], 2);
    // Everything happened today.
    assert_eq!(report.timeline.len(), 1);
}

#[tokio::test]
async fn filters_compose_in_order() {
    let kernel = kernel();
    populate(&kernel).await;

    let deployed = kernel.audit_log(&AuditFilter::new().with_action(AuditAction::Deployed));
    assert_eq!(deployed.len(), 2);

    let limited = kernel.audit_log(
        &AuditFilter::new()
            .with_action(AuditAction::Deployed)
            .with_limit(1),
    );
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0], deployed[0]);
}

#[tokio::test]
async fn audit_log_is_idempotent_absent_writes() {
    let kernel = kernel();
    populate(&kernel).await;

    let filter = AuditFilter::new().with_user("alice");
    assert_eq!(kernel.audit_log(&filter), kernel.audit_log(&filter));
}
