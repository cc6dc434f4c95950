//! Core type definitions for the Aegis governance pipeline.
//!
//! This crate provides the shared data model flowing through the pipeline:
//! decisions produced by upstream analysis, risk evaluations, consultation
//! requests and learned patterns, promotion requests with their lifecycle
//! state, audit entries, rollback requests, and repository contexts.

#![deny(unsafe_code)]

pub mod audit;
pub mod consultation;
pub mod decision;
pub mod ids;
pub mod promotion;
pub mod repository;
pub mod risk;

// Re-export primary types at crate root for ergonomic use.
pub use audit::{AuditAction, PromotionAuditEntry, RollbackRequest, RollbackStatus};
pub use consultation::{
    Alternative, ConsultationPattern, ConsultationRequest, ConsultationResponse,
    ConsultationTrigger, DecisionAnalysis, Recommendation,
};
pub use decision::{ChangeSpec, Decision, DecisionContext, DecisionType};
pub use ids::{ConsultationId, PromotionId, RollbackId};
pub use promotion::{
    ChangeDescription, FileChangeType, ImpactAssessment, ImpactRisk, PromotionRequest,
    PromotionStatus, RollbackComplexity, RollbackPlan, TestFailure, TestResults,
};
pub use repository::RepositoryContext;
pub use risk::{MitigationStrategy, Risk, RiskCategory, RiskEvaluation, RiskSeverity};
