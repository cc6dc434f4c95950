//! The promotion store: id-keyed, owned by its manager.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use aegis_audit::PromotionDirectory;
use aegis_types::{PromotionId, PromotionRequest};

/// Id-keyed store of promotion requests.
///
/// Handles are cheap clones sharing the same underlying map; the rollback
/// manager reads through one via [`PromotionDirectory`].
#[derive(Clone)]
pub struct PromotionStore {
    inner: Arc<RwLock<HashMap<PromotionId, PromotionRequest>>>,
}

impl PromotionStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn insert(&self, promotion: PromotionRequest) {
        self.inner
            .write()
            .expect("lock not poisoned")
            .insert(promotion.id.clone(), promotion);
    }

    pub fn get(&self, id: &PromotionId) -> Option<PromotionRequest> {
        self.inner.read().expect("lock not poisoned").get(id).cloned()
    }

    /// Apply a mutation to a stored promotion, returning the updated copy.
    pub fn update<F>(&self, id: &PromotionId, mutate: F) -> Option<PromotionRequest>
    where
        F: FnOnce(&mut PromotionRequest),
    {
        let mut inner = self.inner.write().expect("lock not poisoned");
        let promotion = inner.get_mut(id)?;
        mutate(promotion);
        Some(promotion.clone())
    }

    /// Every stored promotion.
    pub fn all(&self) -> Vec<PromotionRequest> {
        self.inner
            .read()
            .expect("lock not poisoned")
            .values()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("lock not poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PromotionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PromotionDirectory for PromotionStore {
    fn find(&self, id: &PromotionId) -> Option<PromotionRequest> {
        self.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aegis_types::{ImpactAssessment, PromotionStatus, RollbackPlan, TestResults};
    use chrono::Utc;

    fn promotion() -> PromotionRequest {
        PromotionRequest {
            id: PromotionId::new(),
            title: "t".into(),
            description: "d".into(),
            status: PromotionStatus::Pending,
            created_at: Utc::now(),
            changes: vec![],
            test_results: TestResults::all_passing(1, 10),
            impact: ImpactAssessment::low_risk(),
            rollback_plan: RollbackPlan::git_revert(),
            approved_by: None,
            approved_at: None,
        }
    }

    #[test]
    fn clones_share_state() {
        let store = PromotionStore::new();
        let handle = store.clone();
        let p = promotion();
        let id = p.id.clone();
        store.insert(p);
        assert!(handle.get(&id).is_some());
    }

    #[test]
    fn update_mutates_in_place() {
        let store = PromotionStore::new();
        let p = promotion();
        let id = p.id.clone();
        store.insert(p);

        let updated = store
            .update(&id, |p| p.status = PromotionStatus::Approved)
            .unwrap();
        assert_eq!(updated.status, PromotionStatus::Approved);
        assert_eq!(store.get(&id).unwrap().status, PromotionStatus::Approved);
    }

    #[test]
    fn directory_lookup() {
        let store = PromotionStore::new();
        let p = promotion();
        let id = p.id.clone();
        store.insert(p);
        let directory: &dyn PromotionDirectory = &store;
        assert!(directory.find(&id).is_some());
        assert!(directory.find(&PromotionId::new()).is_none());
    }
}
