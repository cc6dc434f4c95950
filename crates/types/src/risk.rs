//! Risk model: individual risks, severities, and derived evaluations.

use serde::{Deserialize, Serialize};

/// Severity of a single risk, ordered from least to most severe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskSeverity {
    /// Severities that force a human consultation on their own.
    pub fn requires_consultation(&self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }

    /// Tolerant parse used when decoding advisory output; unknown or missing
    /// values fall back to `Medium`.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Self::Low,
            "high" => Self::High,
            "critical" => Self::Critical,
            _ => Self::Medium,
        }
    }
}

impl std::fmt::Display for RiskSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        };
        write!(f, "{}", s)
    }
}

/// The five fixed categories the advisory service enumerates risks across.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskCategory {
    Technical,
    Security,
    Operational,
    Business,
    Maintenance,
}

impl RiskCategory {
    pub const ALL: [RiskCategory; 5] = [
        Self::Technical,
        Self::Security,
        Self::Operational,
        Self::Business,
        Self::Maintenance,
    ];

    /// Tolerant parse used when decoding advisory output; unknown or missing
    /// values fall back to `Technical`.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "security" => Self::Security,
            "operational" => Self::Operational,
            "business" => Self::Business,
            "maintenance" => Self::Maintenance,
            _ => Self::Technical,
        }
    }

    /// Category-keyed default mitigation, used when the advisory service is
    /// unavailable.
    pub fn default_mitigation(&self) -> &'static str {
        match self {
            Self::Technical => "Add regression tests and stage the change behind a feature flag",
            Self::Security => "Request a security review and restrict the change to least privilege",
            Self::Operational => "Deploy during a low-traffic window with monitoring on key metrics",
            Self::Business => "Confirm the change with stakeholders before rollout",
            Self::Maintenance => "Document the change and schedule a follow-up review",
        }
    }
}

impl std::fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Technical => "technical",
            Self::Security => "security",
            Self::Operational => "operational",
            Self::Business => "business",
            Self::Maintenance => "maintenance",
        };
        write!(f, "{}", s)
    }
}

/// A single identified risk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Risk {
    /// What could go wrong.
    pub description: String,
    /// Likelihood of occurrence, 0-100.
    pub likelihood: u8,
    /// Severity if it occurs.
    pub severity: RiskSeverity,
    /// Which of the five fixed categories this risk belongs to.
    pub category: RiskCategory,
    /// Mitigation, if one has been attached.
    pub mitigation: Option<String>,
}

impl Risk {
    pub fn new(
        description: impl Into<String>,
        likelihood: u8,
        severity: RiskSeverity,
        category: RiskCategory,
    ) -> Self {
        Self {
            description: description.into(),
            likelihood: likelihood.min(100),
            severity,
            category,
            mitigation: None,
        }
    }

    pub fn with_mitigation(mut self, mitigation: impl Into<String>) -> Self {
        self.mitigation = Some(mitigation.into());
        self
    }
}

/// A mitigation strategy for one risk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MitigationStrategy {
    /// Description of the risk being mitigated.
    pub risk: String,
    /// The mitigation itself.
    pub strategy: String,
    /// Estimated effort in hours.
    pub effort_hours: u32,
    /// Expected effectiveness, 0-100.
    pub effectiveness: u8,
}

/// The outcome of evaluating a decision's risks.
///
/// Derived, not persisted independently; recomputed per evaluation call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskEvaluation {
    /// Every identified risk.
    pub risks: Vec<Risk>,
    /// Overall severity across all risks.
    pub overall_risk: RiskSeverity,
    /// Whether a human must be consulted before proceeding.
    pub requires_consultation: bool,
    /// Mitigation strategies for every medium-or-worse risk.
    pub mitigation_strategies: Vec<MitigationStrategy>,
    /// One-paragraph summary of the evaluation.
    pub reasoning: String,
}

impl RiskEvaluation {
    /// Number of risks at `High` severity or above.
    pub fn high_severity_count(&self) -> usize {
        self.risks
            .iter()
            .filter(|r| r.severity >= RiskSeverity::High)
            .count()
    }
}
