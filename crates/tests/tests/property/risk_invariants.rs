//! Property tests for the risk-scoring invariants.

use aegis_risk::RiskEvaluator;
use aegis_types::{Risk, RiskCategory, RiskSeverity};
use proptest::prelude::*;

fn severity_strategy() -> impl Strategy<Value = RiskSeverity> {
    prop_oneof![
        Just(RiskSeverity::Low),
        Just(RiskSeverity::Medium),
        Just(RiskSeverity::High),
        Just(RiskSeverity::Critical),
    ]
}

fn risk_strategy() -> impl Strategy<Value = Risk> {
    (severity_strategy(), 0u8..=100).prop_map(|(severity, likelihood)| {
        Risk::new("generated", likelihood, severity, RiskCategory::Technical)
    })
}

proptest! {
    /// The overall risk never falls below the worst individual risk.
    #[test]
    fn overall_at_least_max_individual(risks in prop::collection::vec(risk_strategy(), 1..12)) {
        let max = risks.iter().map(|r| r.severity).max().unwrap();
        prop_assert!(RiskEvaluator::overall_risk(&risks) >= max);
    }

    /// Three or more medium risks with nothing above medium escalate to
    /// high; otherwise the overall equals the maximum.
    #[test]
    fn medium_escalation_rule(medium_count in 0usize..6, low_count in 0usize..6) {
        let mut risks = Vec::new();
        for _ in 0..medium_count {
            risks.push(Risk::new("m", 50, RiskSeverity::Medium, RiskCategory::Technical));
        }
        for _ in 0..low_count {
            risks.push(Risk::new("l", 50, RiskSeverity::Low, RiskCategory::Technical));
        }
        prop_assume!(!risks.is_empty());

        let overall = RiskEvaluator::overall_risk(&risks);
        if medium_count >= 3 {
            prop_assert_eq!(overall, RiskSeverity::High);
        } else if medium_count > 0 {
            prop_assert_eq!(overall, RiskSeverity::Medium);
        } else {
            prop_assert_eq!(overall, RiskSeverity::Low);
        }
    }

    /// Escalation never manufactures a critical rating.
    #[test]
    fn escalation_caps_at_high(risks in prop::collection::vec(risk_strategy(), 1..12)) {
        let max = risks.iter().map(|r| r.severity).max().unwrap();
        if max < RiskSeverity::Critical {
            prop_assert!(RiskEvaluator::overall_risk(&risks) < RiskSeverity::Critical);
        }
    }
}
