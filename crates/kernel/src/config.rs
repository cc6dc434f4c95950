//! Governance configuration.

use serde::{Deserialize, Serialize};

use aegis_audit::RollbackConfig;
use aegis_consultation::ConsultationConfig;
use aegis_promotion::PromotionConfig;

/// Configuration for the whole governance pipeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// Identifier of the agent's own home repository.
    pub home_repo_id: String,
    /// Filesystem root of the home repository.
    pub home_repo_path: String,
    /// Path fragments identifying the agent's own source tree.
    pub self_source_markers: Vec<String>,
    /// Affected-component count above which a change is high impact.
    pub high_impact_component_threshold: usize,
    /// Estimated confidence below which a consultation is triggered.
    pub uncertainty_confidence_threshold: u8,
    /// Historical rejection fraction at which consultation is forced.
    pub pattern_rejection_threshold: f64,
    /// Production-equivalent base branch.
    pub production_branch: String,
    /// Prefix for generated promotion branches.
    pub branch_prefix: String,
    /// Remote test command run during deployment.
    pub test_command: String,
    /// Optional deploy command run after tests pass.
    pub deploy_command: Option<String>,
    /// Whether approval immediately triggers deployment.
    pub auto_deploy_on_approval: bool,
    /// Whether rollback requests require explicit approval.
    pub require_rollback_approval: bool,
    /// How long after deployment a promotion stays rollback-eligible.
    pub rollback_window_hours: i64,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            home_repo_id: "agent-home".into(),
            home_repo_path: "/srv/agent".into(),
            self_source_markers: vec!["agent/src".into()],
            high_impact_component_threshold: 5,
            uncertainty_confidence_threshold: 70,
            pattern_rejection_threshold: 0.7,
            production_branch: "main".into(),
            branch_prefix: "promotion/".into(),
            test_command: "cargo test --all".into(),
            deploy_command: None,
            auto_deploy_on_approval: false,
            require_rollback_approval: true,
            rollback_window_hours: 72,
        }
    }
}

impl GovernanceConfig {
    /// Strict production posture: more consultation, manual everything.
    pub fn strict() -> Self {
        Self {
            high_impact_component_threshold: 3,
            uncertainty_confidence_threshold: 80,
            pattern_rejection_threshold: 0.5,
            auto_deploy_on_approval: false,
            require_rollback_approval: true,
            rollback_window_hours: 48,
            ..Self::default()
        }
    }

    /// Permissive development posture: fewer consultations, automatic
    /// deployment and rollback.
    pub fn permissive() -> Self {
        Self {
            high_impact_component_threshold: 10,
            uncertainty_confidence_threshold: 50,
            auto_deploy_on_approval: true,
            require_rollback_approval: false,
            rollback_window_hours: 168,
            ..Self::default()
        }
    }

    /// The consultation-policy slice of this configuration.
    pub fn consultation(&self) -> ConsultationConfig {
        ConsultationConfig {
            high_impact_component_threshold: self.high_impact_component_threshold,
            uncertainty_confidence_threshold: self.uncertainty_confidence_threshold,
            pattern_rejection_threshold: self.pattern_rejection_threshold,
            self_source_markers: self.self_source_markers.clone(),
        }
    }

    /// The promotion-lifecycle slice of this configuration.
    pub fn promotion(&self) -> PromotionConfig {
        PromotionConfig {
            production_branch: self.production_branch.clone(),
            branch_prefix: self.branch_prefix.clone(),
            test_command: self.test_command.clone(),
            deploy_command: self.deploy_command.clone(),
            auto_deploy_on_approval: self.auto_deploy_on_approval,
        }
    }

    /// The rollback-policy slice of this configuration.
    pub fn rollback(&self) -> RollbackConfig {
        RollbackConfig {
            require_approval: self.require_rollback_approval,
            window_hours: self.rollback_window_hours,
        }
    }
}
