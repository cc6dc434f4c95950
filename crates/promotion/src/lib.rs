//! Promotion lifecycle management for the Aegis pipeline.
//!
//! The [`PromotionLifecycleManager`] owns the promotion state machine:
//!
//! ```text
//! pending --approve--> approved --deploy--> deployed
//! pending --reject--> rejected
//! ```
//!
//! Deployment runs as a guarded pipeline: isolation assert, pull request on
//! the production repository, remote test run, optional deploy command, then
//! the terminal `deployed` mark. Failures at any step are captured into the
//! returned [`DeployOutcome`] rather than thrown; the promotion stays in its
//! pre-deployment state.

#![deny(unsafe_code)]

pub mod describe;
pub mod error;
pub mod manager;
pub mod notify;
pub mod repo;
pub mod store;

pub use describe::pr_description;
pub use error::PromotionError;
pub use manager::{
    ApprovalOutcome, DeployOutcome, NewPromotion, PromotionConfig, PromotionLifecycleManager,
};
pub use notify::{
    FailingNotifier, Notification, NotificationKind, Notifier, NotifyError, RecordingNotifier,
};
pub use repo::{CommandRun, PullRequest, RepoWorkflow, SimulatedRepo, TestRun, WorkflowError};
pub use store::PromotionStore;
