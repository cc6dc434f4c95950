//! The repository isolation guard.

use std::sync::RwLock;

use aegis_types::RepositoryContext;

use crate::error::IsolationError;
use crate::path;

/// A registered repository root.
#[derive(Clone, Debug)]
struct RegisteredRepository {
    repo_id: String,
    /// Normalized filesystem root.
    root: String,
}

/// Tracks which repository is "current" and enforces boundaries.
///
/// The context stack is intended for a single logical sequence of operations;
/// callers operating on multiple repositories concurrently must use
/// independent guard instances or serialize per repository.
pub struct RepositoryIsolationGuard {
    /// Identifier of the agent's own home repository.
    home_repo_id: String,
    /// Normalized path of the home repository.
    home_path: String,
    registered: RwLock<Vec<RegisteredRepository>>,
    stack: RwLock<Vec<RepositoryContext>>,
}

impl RepositoryIsolationGuard {
    /// Create a guard for an agent homed at `home_path`. The home repository
    /// is registered automatically.
    pub fn new(home_repo_id: impl Into<String>, home_path: &str) -> Self {
        let home_repo_id = home_repo_id.into();
        let home_path = path::normalize(home_path);
        Self {
            registered: RwLock::new(vec![RegisteredRepository {
                repo_id: home_repo_id.clone(),
                root: home_path.clone(),
            }]),
            home_repo_id,
            home_path,
            stack: RwLock::new(Vec::new()),
        }
    }

    /// Register a repository root the agent is allowed to operate in.
    pub fn register_repository(&self, repo_id: impl Into<String>, root: &str) {
        let mut registered = self.registered.write().expect("lock not poisoned");
        registered.push(RegisteredRepository {
            repo_id: repo_id.into(),
            root: path::normalize(root),
        });
    }

    /// Enter a repository context. The returned scope pops the context when
    /// dropped, restoring the caller's context on every exit path.
    pub fn enter(&self, context: RepositoryContext) -> ContextScope<'_> {
        tracing::debug!(repo = %context.repo_id, "entering repository context");
        self.stack
            .write()
            .expect("lock not poisoned")
            .push(context);
        ContextScope { guard: self }
    }

    /// The current context, if any.
    pub fn current(&self) -> Option<RepositoryContext> {
        self.stack.read().expect("lock not poisoned").last().cloned()
    }

    /// Depth of the context stack.
    pub fn depth(&self) -> usize {
        self.stack.read().expect("lock not poisoned").len()
    }

    /// The current context, or `NoActiveContext` if the stack is empty.
    pub fn require_context(&self) -> Result<RepositoryContext, IsolationError> {
        self.current().ok_or(IsolationError::NoActiveContext)
    }

    /// Fail if the current context is the agent's home repository.
    ///
    /// Must run immediately before every write operation (branch creation,
    /// commit, push), not only at operation entry.
    pub fn assert_home_repo_untouched(&self) -> Result<(), IsolationError> {
        let context = self.require_context()?;
        if path::normalize(&context.repo_path) == self.home_path {
            return Err(IsolationError::HomeRepositoryWrite {
                path: context.repo_path,
            });
        }
        Ok(())
    }

    /// Verify a path stays inside its expected repository.
    ///
    /// - Paths inside the home repository are rejected unconditionally.
    /// - Paths under no registered root are rejected.
    /// - With `expected_repo_id` (or an active context), a path owned by a
    ///   different repository is rejected.
    ///
    /// Returns the owning repository id on success.
    pub fn verify_separation(
        &self,
        target: &str,
        expected_repo_id: Option<&str>,
    ) -> Result<String, IsolationError> {
        let normalized = path::normalize(target);

        if path::is_within(&self.home_path, &normalized) {
            return Err(IsolationError::HomeRepositoryWrite {
                path: target.to_string(),
            });
        }

        let registered = self.registered.read().expect("lock not poisoned");
        let owner = registered
            .iter()
            .find(|r| path::is_within(&r.root, &normalized))
            .map(|r| r.repo_id.clone())
            .ok_or_else(|| IsolationError::UnregisteredPath(target.to_string()))?;
        drop(registered);

        let expected = match expected_repo_id {
            Some(id) => Some(id.to_string()),
            None => self.current().map(|c| c.repo_id),
        };
        if let Some(expected) = expected {
            if owner != expected {
                return Err(IsolationError::BoundaryCrossed {
                    path: target.to_string(),
                    expected,
                    actual: owner,
                });
            }
        }
        Ok(owner)
    }

    /// Identifier of the home repository.
    pub fn home_repo_id(&self) -> &str {
        &self.home_repo_id
    }

    fn pop(&self) {
        let popped = self.stack.write().expect("lock not poisoned").pop();
        if let Some(context) = popped {
            tracing::debug!(repo = %context.repo_id, "restored caller repository context");
        }
    }
}

/// RAII scope returned by [`RepositoryIsolationGuard::enter`]; pops the
/// context on drop.
pub struct ContextScope<'a> {
    guard: &'a RepositoryIsolationGuard,
}

impl Drop for ContextScope<'_> {
    fn drop(&mut self) {
        self.guard.pop();
    }
}
