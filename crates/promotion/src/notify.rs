//! Notification sink — fire-and-forget lifecycle notifications.
//!
//! Failures are logged by the caller and never propagated.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use aegis_types::PromotionId;

/// A notification could not be delivered.
#[derive(Debug, Error)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// What happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ApprovalRequested,
    Approved,
    Rejected,
    Deployed,
    DeploymentFailed,
    RolledBack,
}

/// A lifecycle notification payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// What happened.
    pub kind: NotificationKind,
    /// The promotion concerned.
    pub promotion_id: PromotionId,
    /// Promotion title.
    pub title: String,
    /// Who approved, where relevant.
    pub approver: Option<String>,
    /// Status string at notification time.
    pub status: String,
    /// Deployment or pull-request URL, where relevant.
    pub url: Option<String>,
    /// When the notification was emitted.
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub fn new(kind: NotificationKind, promotion_id: PromotionId, title: impl Into<String>) -> Self {
        Self {
            kind,
            promotion_id,
            title: title.into(),
            approver: None,
            status: String::new(),
            url: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_approver(mut self, approver: impl Into<String>) -> Self {
        self.approver = Some(approver.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Trait for the notification transport.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one notification.
    async fn notify(&self, notification: Notification) -> Result<(), NotifyError>;
}

/// A notifier that records everything it receives, for tests.
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Notifications delivered so far.
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().expect("lock not poisoned").clone()
    }
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        self.sent.lock().expect("lock not poisoned").push(notification);
        Ok(())
    }
}

/// A notifier that always fails delivery, for exercising the
/// fire-and-forget policy.
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify(&self, _notification: Notification) -> Result<(), NotifyError> {
        Err(NotifyError("simulated transport failure".into()))
    }
}
