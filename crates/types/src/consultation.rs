//! Consultation model: triggers, requests, responses, and learned patterns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decision::{Decision, DecisionType};
use crate::ids::ConsultationId;
use crate::promotion::ImpactAssessment;
use crate::risk::RiskEvaluation;

/// A named reason a consultation was required.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsultationTrigger {
    HighImpact,
    HighRisk,
    Architectural,
    SelfModification,
    UserPreference,
    Uncertainty,
    Precedent,
    TieBreaking,
}

impl std::fmt::Display for ConsultationTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::HighImpact => "high_impact",
            Self::HighRisk => "high_risk",
            Self::Architectural => "architectural",
            Self::SelfModification => "self_modification",
            Self::UserPreference => "user_preference",
            Self::Uncertainty => "uncertainty",
            Self::Precedent => "precedent",
            Self::TieBreaking => "tie_breaking",
        };
        write!(f, "{}", s)
    }
}

impl ConsultationTrigger {
    /// Tolerant parse for re-deriving persisted patterns. Unknown values are
    /// rejected rather than defaulted so malformed records can be skipped.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "high_impact" => Some(Self::HighImpact),
            "high_risk" => Some(Self::HighRisk),
            "architectural" => Some(Self::Architectural),
            "self_modification" => Some(Self::SelfModification),
            "user_preference" => Some(Self::UserPreference),
            "uncertainty" => Some(Self::Uncertainty),
            "precedent" => Some(Self::Precedent),
            "tie_breaking" => Some(Self::TieBreaking),
            _ => None,
        }
    }
}

/// Analysis data accompanying a decision into the consultation engine.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionAnalysis {
    /// Risk evaluation for the decision, if one was computed.
    pub risks: Option<RiskEvaluation>,
    /// Impact assessment for the decision, if one was computed.
    pub impact: Option<ImpactAssessment>,
}

impl DecisionAnalysis {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_risks(mut self, risks: RiskEvaluation) -> Self {
        self.risks = Some(risks);
        self
    }

    pub fn with_impact(mut self, impact: ImpactAssessment) -> Self {
        self.impact = Some(impact);
        self
    }
}

/// One alternative course of action offered to the human.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    /// Short name of the option.
    pub option: String,
    /// Arguments for.
    pub pros: Vec<String>,
    /// Arguments against.
    pub cons: Vec<String>,
    /// Estimated effort in hours.
    pub estimated_effort_hours: u32,
    /// Risks specific to this alternative.
    pub risks: Vec<String>,
}

/// The engine's recommended option.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// The recommended option.
    pub option: String,
    /// Why this option is recommended.
    pub reasoning: String,
    /// Confidence in the recommendation, 0-100.
    pub confidence: u8,
}

/// A request for human consultation on a decision.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConsultationRequest {
    /// Unique identifier for this request.
    pub id: ConsultationId,
    /// The decision under consultation.
    pub decision: Decision,
    /// Every trigger that fired for this decision.
    pub triggers: Vec<ConsultationTrigger>,
    /// Analysis data the triggers were computed from.
    pub analysis: DecisionAnalysis,
    /// Alternative courses of action.
    pub alternatives: Vec<Alternative>,
    /// The engine's recommendation.
    pub recommendation: Recommendation,
    /// Identifiers of similar past decisions, for reference.
    pub past_decisions: Vec<String>,
    /// Deterministic human-readable summary; part of the audit record.
    pub context: String,
    /// When the request was built.
    pub timestamp: DateTime<Utc>,
}

/// The human's answer to a consultation request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConsultationResponse {
    /// Whether the human approved the decision.
    pub approved: bool,
    /// Freeform feedback.
    pub feedback: String,
    /// Requested modifications, if any.
    pub modifications: Vec<String>,
    /// The human's confidence in their verdict, 0-100.
    pub confidence: Option<u8>,
    /// Standing guidance for similar future decisions.
    pub guidance: Option<String>,
    /// When the response was given.
    pub timestamp: DateTime<Utc>,
}

impl ConsultationResponse {
    pub fn approve(feedback: impl Into<String>) -> Self {
        Self {
            approved: true,
            feedback: feedback.into(),
            modifications: Vec::new(),
            confidence: None,
            guidance: None,
            timestamp: Utc::now(),
        }
    }

    pub fn reject(feedback: impl Into<String>) -> Self {
        Self {
            approved: false,
            feedback: feedback.into(),
            modifications: Vec::new(),
            confidence: None,
            guidance: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_confidence(mut self, confidence: u8) -> Self {
        self.confidence = Some(confidence.min(100));
        self
    }

    pub fn with_guidance(mut self, guidance: impl Into<String>) -> Self {
        self.guidance = Some(guidance.into());
        self
    }
}

/// A learned record of how consultations for one (decision-type, trigger-set)
/// combination have historically resolved.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConsultationPattern {
    /// Decision type the pattern applies to.
    pub decision_type: DecisionType,
    /// The trigger set, sorted canonically.
    pub triggers: Vec<ConsultationTrigger>,
    /// Whether the most recent consultation was approved.
    pub user_approved: bool,
    /// How many observations this pattern aggregates.
    pub frequency: u32,
    /// When the pattern was last observed.
    pub last_seen: DateTime<Utc>,
}

impl ConsultationPattern {
    /// Canonical key for a (decision-type, trigger-set) combination.
    /// Triggers are sorted so the key is order-independent.
    pub fn key_for(decision_type: DecisionType, triggers: &[ConsultationTrigger]) -> String {
        let mut sorted: Vec<ConsultationTrigger> = triggers.to_vec();
        sorted.sort();
        sorted.dedup();
        let trigger_part: Vec<String> = sorted.iter().map(|t| t.to_string()).collect();
        format!("{}|{}", decision_type, trigger_part.join("+"))
    }

    pub fn key(&self) -> String {
        Self::key_for(self.decision_type, &self.triggers)
    }
}
