//! The consultation engine.

use std::collections::HashMap;
use std::sync::Arc;

use aegis_advisory::{decoder, Advisor, AdvisoryTask, PromptBuilder};
use aegis_store::RecordStore;
use aegis_types::{
    Alternative, ConsultationId, ConsultationRequest, ConsultationResponse, ConsultationTrigger,
    Decision, DecisionAnalysis, DecisionType, Recommendation,
};
use chrono::Utc;

use crate::patterns::PatternStore;

/// Store category for decisions enriched with consultation feedback.
const DECISION_CATEGORY: &str = "decision";

/// Consultation policy thresholds.
#[derive(Clone, Debug)]
pub struct ConsultationConfig {
    /// Affected-component count above which a change is high impact.
    pub high_impact_component_threshold: usize,
    /// Estimated confidence below which the engine is uncertain.
    pub uncertainty_confidence_threshold: u8,
    /// Historical rejection fraction at which consultation is forced.
    pub pattern_rejection_threshold: f64,
    /// Path fragments identifying the agent's own source tree.
    pub self_source_markers: Vec<String>,
}

impl Default for ConsultationConfig {
    fn default() -> Self {
        Self {
            high_impact_component_threshold: 5,
            uncertainty_confidence_threshold: 70,
            pattern_rejection_threshold: 0.7,
            self_source_markers: Vec::new(),
        }
    }
}

impl ConsultationConfig {
    pub fn with_self_source_markers(mut self, markers: Vec<String>) -> Self {
        self.self_source_markers = markers;
        self
    }
}

/// Decides when a human must be consulted, builds the request, and learns
/// from the response.
pub struct ConsultationEngine {
    advisor: Arc<dyn Advisor>,
    store: Arc<dyn RecordStore>,
    patterns: PatternStore,
    config: ConsultationConfig,
}

impl ConsultationEngine {
    pub fn new(
        advisor: Arc<dyn Advisor>,
        store: Arc<dyn RecordStore>,
        config: ConsultationConfig,
    ) -> Self {
        Self {
            advisor,
            patterns: PatternStore::new(store.clone()),
            store,
            config,
        }
    }

    /// The learned pattern store.
    pub fn patterns(&self) -> &PatternStore {
        &self.patterns
    }

    /// Evaluate every consultation trigger for a decision.
    ///
    /// Triggers are independent and cumulative; an empty result means no
    /// consultation is required.
    pub fn should_consult(
        &self,
        decision: &Decision,
        analysis: &DecisionAnalysis,
    ) -> Vec<ConsultationTrigger> {
        let mut triggers = Vec::new();

        if let Some(impact) = &analysis.impact {
            if impact.affected_components.len() > self.config.high_impact_component_threshold {
                triggers.push(ConsultationTrigger::HighImpact);
            }
        }

        if analysis
            .risks
            .as_ref()
            .map(|r| r.requires_consultation)
            .unwrap_or(false)
        {
            triggers.push(ConsultationTrigger::HighRisk);
        }

        if decision.decision_type == DecisionType::Architectural {
            triggers.push(ConsultationTrigger::Architectural);
        }

        if self.touches_own_source(decision) {
            triggers.push(ConsultationTrigger::SelfModification);
        }

        if self.estimate_confidence(decision, analysis)
            < self.config.uncertainty_confidence_threshold
        {
            triggers.push(ConsultationTrigger::Uncertainty);
        }

        if !decision.decision_type.has_precedent() {
            triggers.push(ConsultationTrigger::Precedent);
        }

        // Learned check: a historically-rejected class of change keeps
        // getting human oversight even when nothing else fires.
        let rejected_historically = self
            .patterns
            .rejection_rate(decision.decision_type, &triggers)
            .map(|rate| rate >= self.config.pattern_rejection_threshold)
            .unwrap_or(false);
        if rejected_historically || self.patterns.always_consult(decision.decision_type) {
            triggers.push(ConsultationTrigger::UserPreference);
        }

        triggers
    }

    /// Estimated confidence that the decision can proceed unattended.
    ///
    /// Rules: start at 90; subtract 10/20/35 for medium/high/critical
    /// overall risk; subtract 10 when more than ten files are touched; add
    /// 10 when the decision type has precedent. Clamped to 0-100.
    pub fn estimate_confidence(&self, decision: &Decision, analysis: &DecisionAnalysis) -> u8 {
        let mut confidence: i32 = 90;
        if let Some(risks) = &analysis.risks {
            confidence -= match risks.overall_risk {
                aegis_types::RiskSeverity::Low => 0,
                aegis_types::RiskSeverity::Medium => 10,
                aegis_types::RiskSeverity::High => 20,
                aegis_types::RiskSeverity::Critical => 35,
            };
        }
        if decision.change.files.len() > 10 {
            confidence -= 10;
        }
        if decision.decision_type.has_precedent() {
            confidence += 10;
        }
        confidence.clamp(0, 100) as u8
    }

    /// Build the request presented to the human.
    ///
    /// Alternatives and the recommendation come from the advisory backend;
    /// on failure two fixed heuristic alternatives are substituted and the
    /// first is recommended at 50 confidence.
    pub async fn build_request(
        &self,
        decision: &Decision,
        triggers: Vec<ConsultationTrigger>,
        analysis: DecisionAnalysis,
    ) -> ConsultationRequest {
        let (alternatives, recommendation) = self.generate_alternatives(decision, &triggers).await;
        let past_decisions = self.similar_past_decisions(decision).await;
        let context = Self::context_string(decision, &triggers, &analysis);

        ConsultationRequest {
            id: ConsultationId::new(),
            decision: decision.clone(),
            triggers,
            analysis,
            alternatives,
            recommendation,
            past_decisions,
            context,
            timestamp: Utc::now(),
        }
    }

    /// Incorporate the human's verdict: pattern observations per trigger,
    /// the per-type preference, and the decision's feedback fields. Returns
    /// the enriched decision.
    pub async fn incorporate_feedback(
        &self,
        request: &ConsultationRequest,
        response: &ConsultationResponse,
    ) -> Decision {
        let decision_type = request.decision.decision_type;

        // One observation per trigger, plus one for the exact set when it
        // has more than one member (the set key equals the trigger key for
        // singletons).
        for trigger in &request.triggers {
            self.patterns
                .observe(decision_type, &[*trigger], response.approved)
                .await;
        }
        if request.triggers.len() > 1 {
            self.patterns
                .observe(decision_type, &request.triggers, response.approved)
                .await;
        }

        self.patterns
            .update_preference(decision_type, response.approved, response.confidence)
            .await;

        let mut decision = request.decision.clone();
        decision
            .context
            .attach_feedback(response.feedback.clone(), response.approved);
        self.persist_decision(&decision, response).await;
        decision
    }

    fn touches_own_source(&self, decision: &Decision) -> bool {
        if decision.decision_type == DecisionType::SelfModification {
            return true;
        }
        decision.change.files.iter().any(|file| {
            let file = file.to_lowercase();
            self.config
                .self_source_markers
                .iter()
                .any(|marker| file.contains(&marker.to_lowercase()))
        })
    }

    async fn generate_alternatives(
        &self,
        decision: &Decision,
        triggers: &[ConsultationTrigger],
    ) -> (Vec<Alternative>, Recommendation) {
        let prompt = PromptBuilder::alternatives(decision, triggers);
        let advice = self
            .advisor
            .advise(
                AdvisoryTask::AlternativeGeneration,
                &prompt,
                Some(&PromptBuilder::system_prompt()),
                None,
            )
            .await;

        let content = match advice {
            Ok(advice) => advice.content,
            Err(e) => {
                tracing::warn!(decision = %decision.id, error = %e, "advisory alternatives failed; using heuristics");
                String::new()
            }
        };

        let decoded = decoder::decode_alternatives(&content);
        let alternatives: Vec<Alternative> = if decoded.is_empty() {
            Self::heuristic_alternatives()
        } else {
            decoded
                .into_iter()
                .take(3)
                .map(|d| Alternative {
                    option: d.option,
                    pros: d.pros,
                    cons: d.cons,
                    estimated_effort_hours: d.effort_hours,
                    risks: d.risks,
                })
                .collect()
        };

        let recommendation = match decoder::decode_recommendation(&content) {
            Some(r) => Recommendation {
                option: r.option,
                reasoning: r.reasoning,
                confidence: r.confidence,
            },
            None => Recommendation {
                option: alternatives[0].option.clone(),
                reasoning: "Advisory recommendation unavailable; defaulting to the first alternative."
                    .into(),
                confidence: 50,
            },
        };

        (alternatives, recommendation)
    }

    /// The two fixed alternatives substituted when the advisory backend
    /// fails.
    fn heuristic_alternatives() -> Vec<Alternative> {
        vec![
            Alternative {
                option: "Proceed with the original plan".into(),
                pros: vec!["No additional work required".into()],
                cons: vec!["Identified risks remain unmitigated".into()],
                estimated_effort_hours: 2,
                risks: vec!["Residual risk of the original plan".into()],
            },
            Alternative {
                option: "Proceed with additional safeguards".into(),
                pros: vec!["Reduced blast radius".into(), "Easier to abort".into()],
                cons: vec!["Slower delivery".into()],
                estimated_effort_hours: 6,
                risks: vec!["Safeguards may mask the underlying issue".into()],
            },
        ]
    }

    async fn similar_past_decisions(&self, decision: &Decision) -> Vec<String> {
        match self
            .store
            .search_records(DECISION_CATEGORY, &decision.decision_type.to_string())
            .await
        {
            Ok(records) => records.into_iter().map(|r| r.key).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "past-decision search failed");
                Vec::new()
            }
        }
    }

    /// Deterministic human-readable summary. Its exact shape is part of the
    /// audit record and must remain stable for reproducibility.
    pub fn context_string(
        decision: &Decision,
        triggers: &[ConsultationTrigger],
        analysis: &DecisionAnalysis,
    ) -> String {
        let trigger_list: Vec<String> = triggers.iter().map(|t| t.to_string()).collect();
        let risk_summary = analysis
            .risks
            .as_ref()
            .map(|r| format!("{} ({} risks)", r.overall_risk, r.risks.len()))
            .unwrap_or_else(|| "not evaluated".into());
        let impact_summary = analysis
            .impact
            .as_ref()
            .map(|i| format!("{} ({} components)", i.risk, i.affected_components.len()))
            .unwrap_or_else(|| "not assessed".into());

        format!(
            "Consultation for decision {} ({})\n\
             Description: {}\n\
             Change: {} touching {} file(s)\n\
             Triggers: {}\n\
             Risk: {}\n\
             Impact: {}",
            decision.id,
            decision.decision_type,
            decision.description,
            decision.change.change_type,
            decision.change.files.len(),
            trigger_list.join(", "),
            risk_summary,
            impact_summary,
        )
    }

    async fn persist_decision(&self, decision: &Decision, response: &ConsultationResponse) {
        let payload = format!(
            "DECISION: {}\nTYPE: {}\nAPPROVED: {}\nFEEDBACK: {}\n",
            decision.id, decision.decision_type, response.approved, response.feedback,
        );
        let mut metadata = HashMap::new();
        metadata.insert("decision_type".to_string(), decision.decision_type.to_string());
        if let Err(e) = self
            .store
            .store_record(DECISION_CATEGORY, &decision.id, &payload, metadata)
            .await
        {
            tracing::warn!(decision = %decision.id, error = %e, "could not persist decision feedback");
        }
    }
}
