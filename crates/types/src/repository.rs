//! Repository contexts for the isolation guard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The repository an operation is currently scoped to.
///
/// Contexts are held on a stack so nested operations can enter a different
/// repository and automatically restore the caller's context on exit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryContext {
    /// Stable identifier for the repository.
    pub repo_id: String,
    /// Local filesystem root of the repository.
    pub repo_path: String,
    /// Hosting provider (e.g. "github").
    pub provider: String,
    /// Remote URL, if known.
    pub url: Option<String>,
    /// When this context was entered.
    pub entered_at: DateTime<Utc>,
}

impl RepositoryContext {
    pub fn new(repo_id: impl Into<String>, repo_path: impl Into<String>) -> Self {
        Self {
            repo_id: repo_id.into(),
            repo_path: repo_path.into(),
            provider: "github".into(),
            url: None,
            entered_at: Utc::now(),
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}
