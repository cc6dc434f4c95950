//! The Aegis governance kernel.
//!
//! Wires the pipeline together: risk evaluation, consultation policy,
//! repository isolation, the promotion lifecycle, and the audit/rollback
//! subsystem. Callers inject the external collaborators (advisory backend,
//! record store, repository workflow, notification sink, revert executor);
//! nothing in the pipeline is ambient or static.

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod kernel;

pub use config::GovernanceConfig;
pub use error::KernelError;
pub use kernel::{DecisionAssessment, GovernanceKernel};
