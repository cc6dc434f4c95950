//! Risk evaluation for the Aegis pipeline.
//!
//! [`RiskEvaluator`] turns a [`Decision`](aegis_types::Decision) into a
//! [`RiskEvaluation`](aegis_types::RiskEvaluation): identified risks across
//! the five fixed categories, an overall severity, the consultation flag,
//! mitigation strategies, and a reasoning summary.
//!
//! Evaluation is a pure function of its inputs plus an advisory call; an
//! unavailable advisory backend is always recovered with deterministic
//! heuristics and never surfaces to the caller.

#![deny(unsafe_code)]

pub mod evaluator;

pub use evaluator::RiskEvaluator;
