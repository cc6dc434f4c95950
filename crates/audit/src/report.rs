//! Aggregate audit reporting.

use std::collections::BTreeMap;

use aegis_types::PromotionAuditEntry;
use serde::{Deserialize, Serialize};

/// Aggregated view of the audit trail.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    /// Total entries aggregated.
    pub total_entries: usize,
    /// Entry counts per action.
    pub by_action: BTreeMap<String, usize>,
    /// Entry counts per user.
    pub by_user: BTreeMap<String, usize>,
    /// Entry counts per promotion.
    pub by_promotion: BTreeMap<String, usize>,
    /// Entry counts per day (`YYYY-MM-DD` buckets).
    pub timeline: BTreeMap<String, usize>,
}

impl AuditReport {
    /// Aggregate a report from a list of entries.
    pub fn generate(entries: &[PromotionAuditEntry]) -> Self {
        let mut report = Self {
            total_entries: entries.len(),
            ..Self::default()
        };
        for entry in entries {
            *report.by_action.entry(entry.action.to_string()).or_default() += 1;
            *report.by_user.entry(entry.user.clone()).or_default() += 1;
            *report
                .by_promotion
                .entry(entry.promotion_id.to_string())
                .or_default() += 1;
            *report
                .timeline
                .entry(entry.timestamp.format("%Y-%m-%d").to_string())
                .or_default() += 1;
        }
        report
    }
}
