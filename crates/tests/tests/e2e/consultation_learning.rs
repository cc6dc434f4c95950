//! End-to-end test: human feedback reshapes future consultation behavior.

use std::sync::Arc;

use aegis_advisory::{FailingAdvisor, SimulatedAdvisor};
use aegis_consultation::{ConsultationConfig, ConsultationEngine};
use aegis_store::InMemoryRecordStore;
use aegis_types::{
    ChangeSpec, ConsultationResponse, ConsultationTrigger, Decision, DecisionAnalysis,
    DecisionType,
};

fn engine() -> ConsultationEngine {
    ConsultationEngine::new(
        Arc::new(FailingAdvisor),
        Arc::new(InMemoryRecordStore::new()),
        ConsultationConfig::default(),
    )
}

fn refactoring(id: &str) -> Decision {
    Decision::new(id, "extract a helper module", DecisionType::Refactoring)
        .with_change(ChangeSpec::new("additive", vec!["src/util.rs".into()]))
}

#[tokio::test]
async fn rejection_forces_future_consultations() {
    let engine = engine();
    let analysis = DecisionAnalysis::new();

    // Refactorings start out unattended.
    assert!(engine.should_consult(&refactoring("d-1"), &analysis).is_empty());

    // The human rejects one.
    let request = engine
        .build_request(
            &refactoring("d-1"),
            vec![ConsultationTrigger::Uncertainty],
            DecisionAnalysis::new(),
        )
        .await;
    engine
        .incorporate_feedback(&request, &ConsultationResponse::reject("broke the build last time"))
        .await;

    // Every later refactoring now consults, indefinitely.
    for id in ["d-2", "d-3", "d-4"] {
        let triggers = engine.should_consult(&refactoring(id), &analysis);
        assert!(
            triggers.contains(&ConsultationTrigger::UserPreference),
            "expected user_preference for {}",
            id
        );
    }
}

#[tokio::test]
async fn confident_approvals_do_not_force_consultation() {
    let engine = engine();
    let request = engine
        .build_request(
            &refactoring("d-1"),
            vec![ConsultationTrigger::Uncertainty],
            DecisionAnalysis::new(),
        )
        .await;
    engine
        .incorporate_feedback(
            &request,
            &ConsultationResponse::approve("fine by me").with_confidence(95),
        )
        .await;

    let triggers = engine.should_consult(&refactoring("d-2"), &DecisionAnalysis::new());
    assert!(triggers.is_empty());
}

#[tokio::test]
async fn learned_state_survives_restart() {
    let backend = Arc::new(InMemoryRecordStore::new());
    {
        let engine = ConsultationEngine::new(
            Arc::new(FailingAdvisor),
            backend.clone(),
            ConsultationConfig::default(),
        );
        let request = engine
            .build_request(
                &refactoring("d-1"),
                vec![ConsultationTrigger::Uncertainty],
                DecisionAnalysis::new(),
            )
            .await;
        engine
            .incorporate_feedback(&request, &ConsultationResponse::reject("no"))
            .await;
    }

    // A fresh engine over the same store recovers the learned preference.
    let engine = ConsultationEngine::new(
        Arc::new(FailingAdvisor),
        backend,
        ConsultationConfig::default(),
    );
    engine.patterns().load().await.unwrap();
    let triggers = engine.should_consult(&refactoring("d-2"), &DecisionAnalysis::new());
    assert!(triggers.contains(&ConsultationTrigger::UserPreference));
}

#[tokio::test]
async fn past_decisions_surface_in_later_requests() {
    let advisor = SimulatedAdvisor::new();
    let engine = ConsultationEngine::new(
        Arc::new(advisor),
        Arc::new(InMemoryRecordStore::new()),
        ConsultationConfig::default(),
    );

    // First consultation round persists the decision with its feedback.
    let first = engine
        .build_request(
            &refactoring("d-1"),
            vec![ConsultationTrigger::Uncertainty],
            DecisionAnalysis::new(),
        )
        .await;
    assert!(first.past_decisions.is_empty());
    engine
        .incorporate_feedback(&first, &ConsultationResponse::approve("ok"))
        .await;

    // The next request for the same decision type references it.
    let second = engine
        .build_request(
            &refactoring("d-2"),
            vec![ConsultationTrigger::Uncertainty],
            DecisionAnalysis::new(),
        )
        .await;
    assert_eq!(second.past_decisions, vec!["d-1".to_string()]);
}
