//! Repository workflow collaborator — trait and simulated implementation.
//!
//! Abstracts the source-control and command-execution layer the deployment
//! pipeline drives: branch creation, commits, pushes, test runs, pull
//! requests. Timeouts are owned by the collaborator, not this core.

use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

/// A repository workflow operation failed.
#[derive(Debug, Error)]
#[error("repository workflow failure in {operation}: {message}")]
pub struct WorkflowError {
    /// Which operation failed (e.g. "create_branch").
    pub operation: String,
    /// Failure detail.
    pub message: String,
}

impl WorkflowError {
    pub fn new(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// Result of a remote test run.
#[derive(Clone, Debug)]
pub struct TestRun {
    /// Whether the run passed.
    pub passed: bool,
    /// Captured output.
    pub output: String,
}

/// Result of a generic command run (e.g. the deploy command).
#[derive(Clone, Debug)]
pub struct CommandRun {
    /// Whether the command succeeded.
    pub success: bool,
    /// Captured output.
    pub output: String,
}

/// A created pull request.
#[derive(Clone, Debug)]
pub struct PullRequest {
    /// Web URL of the pull request.
    pub url: String,
    /// Pull request number.
    pub number: u64,
}

/// Trait for the source-control/test-execution collaborator.
#[async_trait]
pub trait RepoWorkflow: Send + Sync {
    /// Create a branch off `base`.
    async fn create_branch(&self, name: &str, base: &str) -> Result<(), WorkflowError>;

    /// Commit the staged changes to a branch.
    async fn commit(&self, branch: &str, message: &str) -> Result<(), WorkflowError>;

    /// Push a branch to the remote.
    async fn push(&self, branch: &str) -> Result<(), WorkflowError>;

    /// Run the configured test command remotely.
    async fn run_tests(&self, command: &str) -> Result<TestRun, WorkflowError>;

    /// Run the configured deploy command.
    async fn run_deploy(&self, command: &str) -> Result<CommandRun, WorkflowError>;

    /// Open a pull request against `base_branch`.
    async fn create_pull_request(
        &self,
        branch: &str,
        title: &str,
        description: &str,
        base_branch: &str,
    ) -> Result<PullRequest, WorkflowError>;

    /// Files changed relative to `base_branch`.
    async fn changed_files(&self, base_branch: &str) -> Result<Vec<String>, WorkflowError>;
}

/// A simulated repository workflow producing deterministic results.
pub struct SimulatedRepo {
    should_succeed: bool,
    tests_pass: bool,
    /// Operations performed, for assertions in tests.
    operations: Mutex<Vec<String>>,
}

impl SimulatedRepo {
    /// Every operation succeeds and tests pass.
    pub fn succeeding() -> Self {
        Self {
            should_succeed: true,
            tests_pass: true,
            operations: Mutex::new(Vec::new()),
        }
    }

    /// Every operation fails.
    pub fn failing() -> Self {
        Self {
            should_succeed: false,
            tests_pass: false,
            operations: Mutex::new(Vec::new()),
        }
    }

    /// Operations succeed but the remote test run fails.
    pub fn tests_failing() -> Self {
        Self {
            should_succeed: true,
            tests_pass: false,
            operations: Mutex::new(Vec::new()),
        }
    }

    /// Operations performed so far, in order.
    pub fn operations(&self) -> Vec<String> {
        self.operations.lock().expect("lock not poisoned").clone()
    }

    fn record(&self, operation: &str) -> Result<(), WorkflowError> {
        self.operations
            .lock()
            .expect("lock not poisoned")
            .push(operation.to_string());
        if self.should_succeed {
            Ok(())
        } else {
            Err(WorkflowError::new(operation, "simulated failure"))
        }
    }
}

#[async_trait]
impl RepoWorkflow for SimulatedRepo {
    async fn create_branch(&self, name: &str, _base: &str) -> Result<(), WorkflowError> {
        self.record(&format!("create_branch:{}", name))
    }

    async fn commit(&self, _branch: &str, _message: &str) -> Result<(), WorkflowError> {
        self.record("commit")
    }

    async fn push(&self, branch: &str) -> Result<(), WorkflowError> {
        self.record(&format!("push:{}", branch))
    }

    async fn run_tests(&self, command: &str) -> Result<TestRun, WorkflowError> {
        self.record(&format!("run_tests:{}", command))?;
        Ok(TestRun {
            passed: self.tests_pass,
            output: if self.tests_pass {
                "all tests passed".into()
            } else {
                "2 tests failed".into()
            },
        })
    }

    async fn run_deploy(&self, command: &str) -> Result<CommandRun, WorkflowError> {
        self.record(&format!("run_deploy:{}", command))?;
        Ok(CommandRun {
            success: true,
            output: "deployed".into(),
        })
    }

    async fn create_pull_request(
        &self,
        _branch: &str,
        title: &str,
        _description: &str,
        _base_branch: &str,
    ) -> Result<PullRequest, WorkflowError> {
        self.record(&format!("create_pull_request:{}", title))?;
        Ok(PullRequest {
            url: "https://github.com/org/production/pull/42".into(),
            number: 42,
        })
    }

    async fn changed_files(&self, _base_branch: &str) -> Result<Vec<String>, WorkflowError> {
        self.record("changed_files")?;
        Ok(vec!["src/lib.rs".into()])
    }
}
