//! Advisory-service collaborator for the Aegis pipeline.
//!
//! This crate provides:
//! - **The `Advisor` trait** ([`Advisor`]) with simulated implementations
//!   ([`SimulatedAdvisor`], [`FailingAdvisor`]).
//! - **Prompt builders** ([`PromptBuilder`]) assembling the fixed structured
//!   text protocols the pipeline sends to the advisory backend.
//! - **The marker-block decoder** ([`decoder`]) parsing free-text advisory
//!   responses with explicit per-field defaults.
//!
//! The pipeline must never fail because the advisory backend is unavailable;
//! callers recover every [`AdvisoryError`] with documented heuristics.

#![deny(unsafe_code)]

pub mod advisor;
pub mod decoder;
pub mod error;
pub mod prompt;

// Re-exports for convenience.
pub use advisor::{Advice, Advisor, AdvisoryTask, FailingAdvisor, SimulatedAdvisor};
pub use decoder::{AlternativeDraft, MitigationDraft, RecommendationDraft, RiskDraft};
pub use error::AdvisoryError;
pub use prompt::PromptBuilder;
