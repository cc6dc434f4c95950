//! The risk evaluator.

use std::sync::Arc;

use aegis_advisory::{decoder, Advisor, AdvisoryTask, PromptBuilder};
use aegis_types::{
    Decision, DecisionType, MitigationStrategy, Risk, RiskCategory, RiskEvaluation, RiskSeverity,
};

/// File count above which a change is considered broad.
const BROAD_CHANGE_FILE_COUNT: usize = 10;

/// Number of medium risks that escalates the overall level to high.
const MEDIUM_ESCALATION_COUNT: usize = 3;

/// Evaluates the risks of a decision.
pub struct RiskEvaluator {
    advisor: Arc<dyn Advisor>,
}

impl RiskEvaluator {
    pub fn new(advisor: Arc<dyn Advisor>) -> Self {
        Self { advisor }
    }

    /// Evaluate a decision's risks.
    ///
    /// Never fails: advisory errors are recovered with
    /// [`Self::heuristic_risks`] and category-default mitigations.
    pub async fn evaluate(&self, decision: &Decision) -> RiskEvaluation {
        let risks = self.identify_risks(decision).await;
        let overall_risk = Self::overall_risk(&risks);
        let requires_consultation = risks
            .iter()
            .any(|r| r.severity.requires_consultation())
            || overall_risk.requires_consultation();
        let mitigation_strategies = self.mitigation_strategies(&risks).await;
        let reasoning = Self::reasoning(&risks, overall_risk, requires_consultation);

        RiskEvaluation {
            risks,
            overall_risk,
            requires_consultation,
            mitigation_strategies,
            reasoning,
        }
    }

    /// Identify risks via the advisory backend, falling back to
    /// deterministic heuristics when the backend fails or returns nothing
    /// usable.
    pub async fn identify_risks(&self, decision: &Decision) -> Vec<Risk> {
        let prompt = PromptBuilder::risk_identification(decision);
        let advice = self
            .advisor
            .advise(
                AdvisoryTask::RiskIdentification,
                &prompt,
                Some(&PromptBuilder::system_prompt()),
                None,
            )
            .await;

        match advice {
            Ok(advice) => {
                let drafts = decoder::decode_risks(&advice.content);
                if drafts.is_empty() {
                    tracing::warn!(
                        decision = %decision.id,
                        "advisory returned no decodable risks; using heuristics"
                    );
                    Self::heuristic_risks(decision)
                } else {
                    drafts
                        .into_iter()
                        .map(|d| Risk::new(d.description, d.likelihood, d.severity, d.category))
                        .collect()
                }
            }
            Err(e) => {
                tracing::warn!(
                    decision = %decision.id,
                    error = %e,
                    "advisory risk identification failed; using heuristics"
                );
                Self::heuristic_risks(decision)
            }
        }
    }

    /// Deterministic fallback risks.
    ///
    /// Rules, cumulative:
    /// - architectural decision: one high technical risk
    /// - security decision: one high security risk
    /// - more than ten files touched: one medium technical risk
    /// - breaking change: one high technical risk
    /// - nothing matched: one low technical risk (a decision is never
    ///   risk-free)
    pub fn heuristic_risks(decision: &Decision) -> Vec<Risk> {
        let mut risks = Vec::new();

        if decision.decision_type == DecisionType::Architectural {
            risks.push(Risk::new(
                "Architectural change may have wide-reaching effects on dependent components",
                60,
                RiskSeverity::High,
                RiskCategory::Technical,
            ));
        }
        if decision.decision_type == DecisionType::Security {
            risks.push(Risk::new(
                "Security-relevant change may alter the system's exposure",
                50,
                RiskSeverity::High,
                RiskCategory::Security,
            ));
        }
        if decision.change.files.len() > BROAD_CHANGE_FILE_COUNT {
            risks.push(Risk::new(
                format!(
                    "Broad change touching {} files increases regression surface",
                    decision.change.files.len()
                ),
                50,
                RiskSeverity::Medium,
                RiskCategory::Technical,
            ));
        }
        if decision.change.is_breaking() {
            risks.push(Risk::new(
                "Breaking change may disrupt consumers of the modified interface",
                55,
                RiskSeverity::High,
                RiskCategory::Technical,
            ));
        }
        if risks.is_empty() {
            risks.push(Risk::new(
                "Routine change with limited scope may still introduce defects",
                20,
                RiskSeverity::Low,
                RiskCategory::Technical,
            ));
        }
        risks
    }

    /// Overall severity: the maximum individual severity, escalated from
    /// medium to high when three or more medium risks are present.
    pub fn overall_risk(risks: &[Risk]) -> RiskSeverity {
        let max = risks
            .iter()
            .map(|r| r.severity)
            .max()
            .unwrap_or(RiskSeverity::Low);
        let medium_count = risks
            .iter()
            .filter(|r| r.severity == RiskSeverity::Medium)
            .count();
        if max == RiskSeverity::Medium && medium_count >= MEDIUM_ESCALATION_COUNT {
            RiskSeverity::High
        } else {
            max
        }
    }

    /// Request a mitigation strategy for every medium-or-worse risk.
    async fn mitigation_strategies(&self, risks: &[Risk]) -> Vec<MitigationStrategy> {
        let mut strategies = Vec::new();
        for risk in risks.iter().filter(|r| r.severity >= RiskSeverity::Medium) {
            let advice = self
                .advisor
                .advise(
                    AdvisoryTask::MitigationPlanning,
                    &PromptBuilder::mitigation(risk),
                    Some(&PromptBuilder::system_prompt()),
                    None,
                )
                .await;

            let strategy = match advice {
                Ok(advice) => decoder::decode_mitigation(&advice.content),
                Err(e) => {
                    tracing::warn!(error = %e, "advisory mitigation failed; using category default");
                    None
                }
            };

            strategies.push(match strategy {
                Some(m) => MitigationStrategy {
                    risk: risk.description.clone(),
                    strategy: m.strategy,
                    effort_hours: m.effort_hours,
                    effectiveness: m.effectiveness,
                },
                None => MitigationStrategy {
                    risk: risk.description.clone(),
                    strategy: risk.category.default_mitigation().to_string(),
                    effort_hours: 4,
                    effectiveness: 50,
                },
            });
        }
        strategies
    }

    /// One-paragraph evaluation summary.
    fn reasoning(risks: &[Risk], overall: RiskSeverity, requires_consultation: bool) -> String {
        let high_count = risks
            .iter()
            .filter(|r| r.severity >= RiskSeverity::High)
            .count();
        format!(
            "Identified {} risk(s), {} of which are high severity or above. \
             Overall risk level is {}. Human consultation is {}.",
            risks.len(),
            high_count,
            overall,
            if requires_consultation {
                "required"
            } else {
                "not required"
            },
        )
    }
}
