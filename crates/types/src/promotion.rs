//! Promotion requests: the central lifecycle entity of the pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::PromotionId;

/// Lifecycle state of a promotion request.
///
/// Transitions only `Pending -> {Approved|Rejected}` and
/// `Approved -> Deployed`. `Deployed` is terminal; a reversal is modeled as a
/// separate rollback request, never as reopening the promotion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromotionStatus {
    Pending,
    Approved,
    Rejected,
    Deployed,
}

impl std::fmt::Display for PromotionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Deployed => "deployed",
        };
        write!(f, "{}", s)
    }
}

/// How one file was changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileChangeType {
    Added,
    Modified,
    Deleted,
}

impl std::fmt::Display for FileChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
        };
        write!(f, "{}", s)
    }
}

/// One file-level change within a promotion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangeDescription {
    /// Path of the changed file.
    pub file: String,
    /// How the file was changed.
    pub change_type: FileChangeType,
    /// Lines added.
    pub lines_added: u32,
    /// Lines removed.
    pub lines_removed: u32,
    /// One-line summary of the change.
    pub summary: String,
}

impl ChangeDescription {
    pub fn new(file: impl Into<String>, change_type: FileChangeType) -> Self {
        Self {
            file: file.into(),
            change_type,
            lines_added: 0,
            lines_removed: 0,
            summary: String::new(),
        }
    }

    pub fn with_lines(mut self, added: u32, removed: u32) -> Self {
        self.lines_added = added;
        self.lines_removed = removed;
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }
}

/// One failing test.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestFailure {
    /// Test name.
    pub name: String,
    /// Failure message.
    pub message: String,
}

/// Results of the test run backing a promotion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestResults {
    /// Whether the run as a whole passed.
    pub passed: bool,
    /// Total tests executed.
    pub total_tests: u32,
    /// Tests that passed.
    pub passed_tests: u32,
    /// Tests that failed.
    pub failed_tests: u32,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
    /// Line coverage fraction, if measured.
    pub coverage: Option<f64>,
    /// Individual failures.
    pub failures: Vec<TestFailure>,
}

impl TestResults {
    /// An all-green run of `total` tests.
    pub fn all_passing(total: u32, duration_ms: u64) -> Self {
        Self {
            passed: true,
            total_tests: total,
            passed_tests: total,
            failed_tests: 0,
            duration_ms,
            coverage: None,
            failures: Vec::new(),
        }
    }

    /// A run with the given failures.
    pub fn with_failures(total: u32, failures: Vec<TestFailure>, duration_ms: u64) -> Self {
        let failed = failures.len() as u32;
        Self {
            passed: false,
            total_tests: total,
            passed_tests: total.saturating_sub(failed),
            failed_tests: failed,
            duration_ms,
            coverage: None,
            failures,
        }
    }
}

/// Coarse risk level of a promotion's impact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactRisk {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for ImpactRisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        write!(f, "{}", s)
    }
}

/// How involved a rollback of this promotion would be.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RollbackComplexity {
    Simple,
    Moderate,
    Complex,
}

/// Assessment of a promotion's impact on the running system.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImpactAssessment {
    /// Coarse risk level.
    pub risk: ImpactRisk,
    /// Components affected by the change.
    pub affected_components: Vec<String>,
    /// Estimated downtime in minutes.
    pub estimated_downtime_mins: u32,
    /// How involved a rollback would be.
    pub rollback_complexity: RollbackComplexity,
    /// Expected benefits.
    pub benefits: Vec<String>,
    /// Known risks.
    pub risks: Vec<String>,
}

impl ImpactAssessment {
    pub fn low_risk() -> Self {
        Self {
            risk: ImpactRisk::Low,
            affected_components: Vec::new(),
            estimated_downtime_mins: 0,
            rollback_complexity: RollbackComplexity::Simple,
            benefits: Vec::new(),
            risks: Vec::new(),
        }
    }

    pub fn with_risk(mut self, risk: ImpactRisk) -> Self {
        self.risk = risk;
        self
    }

    pub fn with_components(mut self, components: Vec<String>) -> Self {
        self.affected_components = components;
        self
    }
}

/// Plan for reversing a deployed promotion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RollbackPlan {
    /// Ordered rollback steps.
    pub steps: Vec<String>,
    /// Estimated execution time in minutes.
    pub estimated_time_mins: u32,
    /// Whether data must be backed up before rollback.
    pub data_backup_required: bool,
    /// Whether the rollback can run without a human.
    pub automatable: bool,
}

impl RollbackPlan {
    pub fn git_revert() -> Self {
        Self {
            steps: vec![
                "Revert the promotion merge commit".into(),
                "Push the revert to the production branch".into(),
                "Verify the build and smoke tests".into(),
            ],
            estimated_time_mins: 10,
            data_backup_required: false,
            automatable: true,
        }
    }
}

/// A proposed, tested bundle of changes awaiting approval and deployment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PromotionRequest {
    /// Unique identifier.
    pub id: PromotionId,
    /// Short title.
    pub title: String,
    /// Longer description.
    pub description: String,
    /// Current lifecycle state.
    pub status: PromotionStatus,
    /// When the request was created.
    pub created_at: DateTime<Utc>,
    /// File-level changes in the bundle.
    pub changes: Vec<ChangeDescription>,
    /// Results of the backing test run.
    pub test_results: TestResults,
    /// Impact assessment.
    pub impact: ImpactAssessment,
    /// Rollback plan.
    pub rollback_plan: RollbackPlan,
    /// Who approved the request, once approved.
    pub approved_by: Option<String>,
    /// When the request was approved.
    pub approved_at: Option<DateTime<Utc>>,
}

impl PromotionRequest {
    /// Total lines touched across all changes.
    pub fn total_lines_changed(&self) -> u32 {
        self.changes
            .iter()
            .map(|c| c.lines_added + c.lines_removed)
            .sum()
    }

    /// Paths of every changed file.
    pub fn files(&self) -> Vec<&str> {
        self.changes.iter().map(|c| c.file.as_str()).collect()
    }
}
