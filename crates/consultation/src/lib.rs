//! Human consultation policy for the Aegis pipeline.
//!
//! The [`ConsultationEngine`] decides whether a human must be consulted for a
//! decision, builds the [`ConsultationRequest`](aegis_types::ConsultationRequest)
//! presented to them, and incorporates their
//! [`ConsultationResponse`](aegis_types::ConsultationResponse) into a learned
//! pattern store — the single point where human judgement alters future
//! automatic behavior.

#![deny(unsafe_code)]

pub mod engine;
pub mod patterns;

pub use engine::{ConsultationConfig, ConsultationEngine};
pub use patterns::PatternStore;
