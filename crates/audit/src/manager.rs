//! Rollback request lifecycle management.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{Duration, Utc};
use aegis_store::RecordStore;
use aegis_types::{
    AuditAction, PromotionAuditEntry, PromotionId, PromotionRequest, PromotionStatus,
    RollbackId, RollbackRequest, RollbackStatus,
};

use crate::error::AuditError;
use crate::revert::RevertExecutor;
use crate::trail::AuditTrail;

/// Store category under which rollback requests are persisted.
const ROLLBACK_CATEGORY: &str = "rollback_request";

/// Lookup into the promotion store, kept as a trait so the audit subsystem
/// stays decoupled from the lifecycle manager.
pub trait PromotionDirectory: Send + Sync {
    /// Find a promotion by id.
    fn find(&self, id: &PromotionId) -> Option<PromotionRequest>;
}

/// Rollback policy configuration.
#[derive(Clone, Debug)]
pub struct RollbackConfig {
    /// When true, a created request stays pending until explicitly approved;
    /// when false, it executes immediately within the creating call.
    pub require_approval: bool,
    /// How long after deployment a promotion stays rollback-eligible.
    pub window_hours: i64,
}

impl Default for RollbackConfig {
    fn default() -> Self {
        Self {
            require_approval: true,
            window_hours: 72,
        }
    }
}

/// Manages rollback requests against deployed promotions.
pub struct RollbackManager {
    trail: Arc<AuditTrail>,
    directory: Arc<dyn PromotionDirectory>,
    revert: Arc<dyn RevertExecutor>,
    store: Arc<dyn RecordStore>,
    requests: RwLock<HashMap<RollbackId, RollbackRequest>>,
    config: RollbackConfig,
}

impl RollbackManager {
    pub fn new(
        trail: Arc<AuditTrail>,
        directory: Arc<dyn PromotionDirectory>,
        revert: Arc<dyn RevertExecutor>,
        store: Arc<dyn RecordStore>,
        config: RollbackConfig,
    ) -> Self {
        Self {
            trail,
            directory,
            revert,
            store,
            requests: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Create a rollback request for a deployed promotion.
    ///
    /// Without `require_approval`, the request executes immediately and
    /// returns already `Completed` or `Failed`.
    pub async fn create_rollback_request(
        &self,
        promotion_id: &PromotionId,
        reason: impl Into<String>,
        requested_by: impl Into<String>,
    ) -> Result<RollbackRequest, AuditError> {
        let promotion = self
            .directory
            .find(promotion_id)
            .ok_or_else(|| AuditError::PromotionNotFound(promotion_id.clone()))?;
        if promotion.status != PromotionStatus::Deployed {
            return Err(AuditError::NotDeployed {
                id: promotion_id.clone(),
                status: promotion.status,
            });
        }

        let request = RollbackRequest::new(promotion_id.clone(), reason, requested_by);
        self.trail.record(
            PromotionAuditEntry::new(
                promotion_id.clone(),
                AuditAction::RollbackRequested,
                request.requested_by.clone(),
            )
            .with_reason(request.reason.clone()),
        );
        let id = request.id.clone();
        self.requests
            .write()
            .expect("lock not poisoned")
            .insert(id.clone(), request.clone());
        self.persist(&request).await;

        if self.config.require_approval {
            Ok(request)
        } else {
            self.execute(&id).await
        }
    }

    /// Approve a pending rollback request; execution follows immediately.
    pub async fn approve_rollback_request(
        &self,
        id: &RollbackId,
        approved_by: impl Into<String>,
    ) -> Result<RollbackRequest, AuditError> {
        {
            let mut requests = self.requests.write().expect("lock not poisoned");
            let request = requests
                .get_mut(id)
                .ok_or_else(|| AuditError::RollbackNotFound(id.clone()))?;
            if request.status != RollbackStatus::Pending {
                return Err(AuditError::InvalidState {
                    id: id.clone(),
                    expected: "pending".into(),
                    actual: request.status,
                });
            }
            request.status = RollbackStatus::Approved;
            request.approved_by = Some(approved_by.into());
            request.approved_at = Some(Utc::now());
        }
        self.execute(id).await
    }

    /// Reject a pending rollback request.
    pub async fn reject_rollback_request(
        &self,
        id: &RollbackId,
        rejected_by: impl Into<String>,
        reason: impl Into<String>,
    ) -> Result<RollbackRequest, AuditError> {
        let rejected_by = rejected_by.into();
        let reason = reason.into();
        let request = {
            let mut requests = self.requests.write().expect("lock not poisoned");
            let request = requests
                .get_mut(id)
                .ok_or_else(|| AuditError::RollbackNotFound(id.clone()))?;
            if request.status != RollbackStatus::Pending {
                return Err(AuditError::InvalidState {
                    id: id.clone(),
                    expected: "pending".into(),
                    actual: request.status,
                });
            }
            request.status = RollbackStatus::Rejected;
            request.clone()
        };
        self.trail.record(
            PromotionAuditEntry::new(
                request.promotion_id.clone(),
                AuditAction::RollbackRejected,
                rejected_by,
            )
            .with_reason(reason),
        );
        self.persist(&request).await;
        Ok(request)
    }

    /// Get a rollback request by id.
    pub fn get(&self, id: &RollbackId) -> Option<RollbackRequest> {
        self.requests
            .read()
            .expect("lock not poisoned")
            .get(id)
            .cloned()
    }

    /// Every rollback request for a promotion.
    pub fn for_promotion(&self, promotion_id: &PromotionId) -> Vec<RollbackRequest> {
        self.requests
            .read()
            .expect("lock not poisoned")
            .values()
            .filter(|r| &r.promotion_id == promotion_id)
            .cloned()
            .collect()
    }

    /// Re-derive rollback request state from the persistence collaborator.
    /// Individually malformed records are skipped. Returns how many loaded.
    pub async fn load(&self) -> Result<usize, AuditError> {
        let records = self.store.search_records(ROLLBACK_CATEGORY, "").await?;
        let mut loaded = 0;
        let mut requests = self.requests.write().expect("lock not poisoned");
        for record in records {
            match serde_json::from_str::<RollbackRequest>(&record.payload) {
                Ok(request) => {
                    requests.insert(request.id.clone(), request);
                    loaded += 1;
                }
                Err(e) => {
                    tracing::warn!(key = %record.key, error = %e, "skipping malformed rollback record");
                }
            }
        }
        Ok(loaded)
    }

    /// Execute a rollback: safety checks, then the underlying revert.
    ///
    /// Safety failures and revert failures both land the request in `Failed`
    /// with the error captured, never as a thrown error.
    async fn execute(&self, id: &RollbackId) -> Result<RollbackRequest, AuditError> {
        let request = self
            .get(id)
            .ok_or_else(|| AuditError::RollbackNotFound(id.clone()))?;
        if request.status.is_terminal() {
            return Err(AuditError::InvalidState {
                id: id.clone(),
                expected: "pending or approved".into(),
                actual: request.status,
            });
        }

        if let Some(error) = self.safety_check(&request) {
            return Ok(self.fail(&request, error).await);
        }

        // The directory lookup was validated at creation; the promotion can
        // no longer leave `Deployed` except via this manager.
        let promotion = match self.directory.find(&request.promotion_id) {
            Some(p) => p,
            None => {
                return Ok(self
                    .fail(&request, "promotion vanished from directory".to_string())
                    .await)
            }
        };

        match self.revert.revert(&promotion).await {
            Ok(result) if result.success => {
                let completed = {
                    let mut requests = self.requests.write().expect("lock not poisoned");
                    let request = requests.get_mut(id).expect("request present");
                    request.status = RollbackStatus::Completed;
                    request.completed_at = Some(Utc::now());
                    request.clone()
                };
                self.trail.record(
                    PromotionAuditEntry::new(
                        completed.promotion_id.clone(),
                        AuditAction::RolledBack,
                        completed.requested_by.clone(),
                    )
                    .with_reason(completed.reason.clone()),
                );
                self.persist(&completed).await;
                Ok(completed)
            }
            Ok(result) => Ok(self.fail(&request, result.output).await),
            Err(e) => Ok(self.fail(&request, e.to_string()).await),
        }
    }

    /// Pre-revert safety checks. Returns the failure reason, if any.
    fn safety_check(&self, request: &RollbackRequest) -> Option<String> {
        let in_flight = self
            .for_promotion(&request.promotion_id)
            .into_iter()
            .any(|r| r.id != request.id && !r.status.is_terminal());
        if in_flight {
            return Some(format!(
                "another rollback for promotion {} is already in flight",
                request.promotion_id,
            ));
        }

        // The trail is the source of truth for deployment time. A promotion
        // with no deployed entry (state restored from elsewhere) passes the
        // window check.
        if let Some(deployed_at) = self.trail.deployed_at(&request.promotion_id) {
            let window = Duration::hours(self.config.window_hours);
            if Utc::now() - deployed_at > window {
                return Some(format!(
                    "rollback window of {}h expired for promotion {}",
                    self.config.window_hours, request.promotion_id,
                ));
            }
        }
        None
    }

    async fn fail(&self, request: &RollbackRequest, error: String) -> RollbackRequest {
        tracing::error!(rollback = %request.id, error = %error, "rollback failed");
        let failed = {
            let mut requests = self.requests.write().expect("lock not poisoned");
            let stored = requests.get_mut(&request.id).expect("request present");
            stored.status = RollbackStatus::Failed;
            stored.completed_at = Some(Utc::now());
            stored.error = Some(error.clone());
            stored.clone()
        };
        self.trail.record(
            PromotionAuditEntry::new(
                failed.promotion_id.clone(),
                AuditAction::RollbackFailed,
                failed.requested_by.clone(),
            )
            .with_reason(error),
        );
        self.persist(&failed).await;
        failed
    }

    /// Persist a request snapshot. Persistence is eventually consistent; a
    /// failed write is logged and the in-memory state remains authoritative.
    async fn persist(&self, request: &RollbackRequest) {
        let payload = match serde_json::to_string(request) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, "could not serialize rollback request");
                return;
            }
        };
        let mut metadata = HashMap::new();
        metadata.insert("promotion_id".to_string(), request.promotion_id.to_string());
        metadata.insert("status".to_string(), request.status.to_string());
        if let Err(e) = self
            .store
            .store_record(ROLLBACK_CATEGORY, &request.id.to_string(), &payload, metadata)
            .await
        {
            tracing::warn!(rollback = %request.id, error = %e, "could not persist rollback request");
        }
    }
}
