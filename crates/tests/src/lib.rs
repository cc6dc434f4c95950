//! Integration and adversarial tests for the Aegis governance pipeline.
//!
//! The suites live under `tests/`:
//! - `e2e/` — full pipeline flows through the kernel
//! - `adversarial/` — attempts to bypass the governance gates
//! - `property/` — property-based invariant checks
