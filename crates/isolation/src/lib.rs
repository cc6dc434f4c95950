//! Repository isolation for the Aegis pipeline.
//!
//! The guard guarantees two things:
//! - operations scoped to one repository cannot silently read or write
//!   another (context stack + separation checks), and
//! - the agent's own home repository is never the target of a direct write;
//!   every change to it flows through the governed promotion path.
//!
//! Contexts are held on a stack so nested operations can enter a different
//! repository and automatically restore the caller's context; [`ContextScope`]
//! pops on drop, on every exit path.

#![deny(unsafe_code)]

pub mod error;
pub mod guard;
pub mod path;

pub use error::IsolationError;
pub use guard::{ContextScope, RepositoryIsolationGuard};
