//! The append-only audit trail.

use std::sync::RwLock;

use chrono::{DateTime, Utc};
use aegis_types::{AuditAction, PromotionAuditEntry, PromotionId};

use crate::error::AuditError;
use crate::export::ExportFormat;
use crate::report::AuditReport;

/// Filter for querying the audit trail.
///
/// Filters apply in order: promotion id, action, user, time window, then the
/// result-count limit.
#[derive(Clone, Debug, Default)]
pub struct AuditFilter {
    pub promotion_id: Option<PromotionId>,
    pub action: Option<AuditAction>,
    pub user: Option<String>,
    /// Inclusive window start.
    pub start: Option<DateTime<Utc>>,
    /// Inclusive window end.
    pub end: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

impl AuditFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_promotion(mut self, id: PromotionId) -> Self {
        self.promotion_id = Some(id);
        self
    }

    pub fn with_action(mut self, action: AuditAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn between(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Append-only store of audit entries.
///
/// Entries are recorded in arrival order and never mutated or deleted.
pub struct AuditTrail {
    entries: RwLock<Vec<PromotionAuditEntry>>,
}

impl AuditTrail {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Append one entry.
    pub fn record(&self, entry: PromotionAuditEntry) {
        tracing::info!(
            promotion = %entry.promotion_id,
            action = %entry.action,
            user = %entry.user,
            "audit entry recorded"
        );
        self.entries.write().expect("lock not poisoned").push(entry);
    }

    /// Query entries matching a filter, in recorded order.
    pub fn log(&self, filter: &AuditFilter) -> Vec<PromotionAuditEntry> {
        let entries = self.entries.read().expect("lock not poisoned");
        let mut matches: Vec<PromotionAuditEntry> = entries
            .iter()
            .filter(|e| {
                filter
                    .promotion_id
                    .as_ref()
                    .map_or(true, |id| &e.promotion_id == id)
            })
            .filter(|e| filter.action.map_or(true, |a| e.action == a))
            .filter(|e| filter.user.as_ref().map_or(true, |u| &e.user == u))
            .filter(|e| filter.start.map_or(true, |s| e.timestamp >= s))
            .filter(|e| filter.end.map_or(true, |t| e.timestamp <= t))
            .cloned()
            .collect();
        if let Some(limit) = filter.limit {
            matches.truncate(limit);
        }
        matches
    }

    /// Every entry, in recorded order.
    pub fn all(&self) -> Vec<PromotionAuditEntry> {
        self.entries.read().expect("lock not poisoned").clone()
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.read().expect("lock not poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// When the given promotion was deployed, per the trail.
    pub fn deployed_at(&self, promotion_id: &PromotionId) -> Option<DateTime<Utc>> {
        self.entries
            .read()
            .expect("lock not poisoned")
            .iter()
            .rev()
            .find(|e| &e.promotion_id == promotion_id && e.action == AuditAction::Deployed)
            .map(|e| e.timestamp)
    }

    /// Aggregate report over the whole trail.
    pub fn report(&self) -> AuditReport {
        AuditReport::generate(&self.all())
    }

    /// Export the whole trail in the given format.
    pub fn export(&self, format: ExportFormat) -> Result<String, AuditError> {
        crate::export::export(&self.all(), format)
    }
}

impl Default for AuditTrail {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry(
        promotion: &PromotionId,
        action: AuditAction,
        user: &str,
        at: DateTime<Utc>,
    ) -> PromotionAuditEntry {
        let mut e = PromotionAuditEntry::new(promotion.clone(), action, user);
        e.timestamp = at;
        e
    }

    fn populated_trail() -> (AuditTrail, PromotionId, PromotionId, DateTime<Utc>) {
        let trail = AuditTrail::new();
        let p1 = PromotionId("p-1".into());
        let p2 = PromotionId("p-2".into());
        let base = Utc::now();
        trail.record(entry(&p1, AuditAction::Created, "system", base));
        trail.record(entry(&p1, AuditAction::Approved, "alice", base + Duration::hours(1)));
        trail.record(entry(&p1, AuditAction::Deployed, "system", base + Duration::hours(2)));
        trail.record(entry(&p2, AuditAction::Created, "system", base + Duration::hours(3)));
        trail.record(entry(&p2, AuditAction::Rejected, "bob", base + Duration::hours(4)));
        (trail, p1, p2, base)
    }

    #[test]
    fn empty_filter_returns_everything() {
        let (trail, ..) = populated_trail();
        assert_eq!(trail.log(&AuditFilter::new()).len(), 5);
    }

    #[test]
    fn filter_by_promotion() {
        let (trail, p1, ..) = populated_trail();
        let entries = trail.log(&AuditFilter::new().for_promotion(p1.clone()));
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| e.promotion_id == p1));
    }

    #[test]
    fn filter_by_action_and_user() {
        let (trail, ..) = populated_trail();
        let entries = trail.log(&AuditFilter::new().with_action(AuditAction::Created));
        assert_eq!(entries.len(), 2);

        let entries = trail.log(&AuditFilter::new().with_user("alice"));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, AuditAction::Approved);
    }

    #[test]
    fn time_window_is_inclusive() {
        let (trail, _, _, base) = populated_trail();
        let entries = trail.log(
            &AuditFilter::new().between(base + Duration::hours(1), base + Duration::hours(3)),
        );
        assert_eq!(entries.len(), 3);
    }

    #[test]
    fn limit_applies_after_other_filters() {
        let (trail, p1, ..) = populated_trail();
        let entries = trail.log(&AuditFilter::new().for_promotion(p1).with_limit(2));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, AuditAction::Created);
        assert_eq!(entries[1].action, AuditAction::Approved);
    }

    #[test]
    fn identical_filters_return_identical_results() {
        let (trail, p1, ..) = populated_trail();
        let filter = AuditFilter::new().for_promotion(p1);
        assert_eq!(trail.log(&filter), trail.log(&filter));
    }

    #[test]
    fn deployed_at_finds_deployment_time() {
        let (trail, p1, p2, base) = populated_trail();
        assert_eq!(trail.deployed_at(&p1), Some(base + Duration::hours(2)));
        assert_eq!(trail.deployed_at(&p2), None);
    }
}
