//! Isolation error types.

use thiserror::Error;

/// Errors raised by the repository isolation guard.
///
/// `HomeRepositoryWrite` and `BoundaryCrossed` are governance violations:
/// always surfaced, fatal to the current operation.
#[derive(Debug, Error)]
pub enum IsolationError {
    /// An operation required a repository context but the stack was empty.
    #[error("no active repository context")]
    NoActiveContext,

    /// A write targeted the agent's own home repository.
    #[error("governance violation: direct write to the home repository at {path} is forbidden; changes must go through a promotion")]
    HomeRepositoryWrite { path: String },

    /// A path escaped the repository it was expected to stay within.
    #[error("governance violation: path {path} belongs to repository '{actual}' but the operation is scoped to '{expected}'")]
    BoundaryCrossed {
        path: String,
        expected: String,
        actual: String,
    },

    /// A path does not fall under any registered repository root.
    #[error("path {0} is not under any registered repository root")]
    UnregisteredPath(String),
}
