//! Learned consultation patterns.
//!
//! One pattern row exists per (decision-type, trigger-set) combination,
//! aggregating how often the human approved or rejected that class of
//! decision. Rows are persisted as marker-line text payloads and re-derived
//! on load; individually malformed records are skipped.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use aegis_store::{RecordStore, StoreError};
use aegis_types::{ConsultationPattern, ConsultationTrigger, DecisionType};

/// Store category for pattern rows.
const PATTERN_CATEGORY: &str = "consultation_pattern";
/// Store category for per-type preference rows.
const PREFERENCE_CATEGORY: &str = "consultation_preference";

/// Aggregated outcome counts for one (decision-type, trigger-set) key.
#[derive(Clone, Debug)]
struct PatternStats {
    pattern: ConsultationPattern,
    approvals: u32,
    rejections: u32,
}

/// Per-decision-type "consult by default" preference.
///
/// An approval with high confidence lowers the propensity; any rejection
/// raises it permanently for that type.
#[derive(Clone, Copy, Debug, Default)]
struct TypePreference {
    always_consult: bool,
    propensity: i32,
}

/// In-memory pattern store backed by the persistence collaborator.
pub struct PatternStore {
    store: Arc<dyn RecordStore>,
    stats: RwLock<HashMap<String, PatternStats>>,
    preferences: RwLock<HashMap<DecisionType, TypePreference>>,
}

impl PatternStore {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            stats: RwLock::new(HashMap::new()),
            preferences: RwLock::new(HashMap::new()),
        }
    }

    /// Record one consultation outcome for a (decision-type, trigger-set)
    /// combination.
    pub async fn observe(
        &self,
        decision_type: DecisionType,
        triggers: &[ConsultationTrigger],
        approved: bool,
    ) {
        let key = ConsultationPattern::key_for(decision_type, triggers);
        let snapshot = {
            let mut stats = self.stats.write().expect("lock not poisoned");
            let entry = stats.entry(key.clone()).or_insert_with(|| PatternStats {
                pattern: ConsultationPattern {
                    decision_type,
                    triggers: triggers.to_vec(),
                    user_approved: approved,
                    frequency: 0,
                    last_seen: Utc::now(),
                },
                approvals: 0,
                rejections: 0,
            });
            entry.pattern.frequency += 1;
            entry.pattern.user_approved = approved;
            entry.pattern.last_seen = Utc::now();
            if approved {
                entry.approvals += 1;
            } else {
                entry.rejections += 1;
            }
            entry.clone()
        };
        self.persist_pattern(&key, &snapshot).await;
    }

    /// Fraction of past consultations for this exact combination that were
    /// rejected. `None` when no observations exist.
    pub fn rejection_rate(
        &self,
        decision_type: DecisionType,
        triggers: &[ConsultationTrigger],
    ) -> Option<f64> {
        let key = ConsultationPattern::key_for(decision_type, triggers);
        let stats = self.stats.read().expect("lock not poisoned");
        stats.get(&key).map(|s| {
            let total = s.approvals + s.rejections;
            if total == 0 {
                0.0
            } else {
                s.rejections as f64 / total as f64
            }
        })
    }

    /// The pattern row for a combination, if one exists.
    pub fn pattern(
        &self,
        decision_type: DecisionType,
        triggers: &[ConsultationTrigger],
    ) -> Option<ConsultationPattern> {
        let key = ConsultationPattern::key_for(decision_type, triggers);
        self.stats
            .read()
            .expect("lock not poisoned")
            .get(&key)
            .map(|s| s.pattern.clone())
    }

    /// Update the per-type preference from a response.
    pub async fn update_preference(
        &self,
        decision_type: DecisionType,
        approved: bool,
        confidence: Option<u8>,
    ) {
        let preference = {
            let mut preferences = self.preferences.write().expect("lock not poisoned");
            let entry = preferences.entry(decision_type).or_default();
            if approved {
                if confidence.unwrap_or(0) > 80 {
                    entry.propensity -= 1;
                }
            } else {
                // A rejection raises the preference permanently.
                entry.always_consult = true;
                entry.propensity += 1;
            }
            *entry
        };
        self.persist_preference(decision_type, preference).await;
    }

    /// Whether this decision type must always be consulted on, because a
    /// human once rejected it.
    pub fn always_consult(&self, decision_type: DecisionType) -> bool {
        self.preferences
            .read()
            .expect("lock not poisoned")
            .get(&decision_type)
            .map(|p| p.always_consult)
            .unwrap_or(false)
    }

    /// Re-derive pattern and preference state from the persistence
    /// collaborator. Malformed records are skipped. Returns how many pattern
    /// rows loaded.
    pub async fn load(&self) -> Result<usize, StoreError> {
        let mut loaded = 0;
        for record in self.store.search_records(PATTERN_CATEGORY, "").await? {
            match parse_pattern_payload(&record.payload) {
                Some(stats) => {
                    self.stats
                        .write()
                        .expect("lock not poisoned")
                        .insert(stats.pattern.key(), stats);
                    loaded += 1;
                }
                None => {
                    tracing::warn!(key = %record.key, "skipping malformed pattern record");
                }
            }
        }
        for record in self.store.search_records(PREFERENCE_CATEGORY, "").await? {
            match parse_preference_payload(&record.payload) {
                Some((decision_type, preference)) => {
                    self.preferences
                        .write()
                        .expect("lock not poisoned")
                        .insert(decision_type, preference);
                }
                None => {
                    tracing::warn!(key = %record.key, "skipping malformed preference record");
                }
            }
        }
        Ok(loaded)
    }

    async fn persist_pattern(&self, key: &str, stats: &PatternStats) {
        let triggers: Vec<String> = stats.pattern.triggers.iter().map(|t| t.to_string()).collect();
        let payload = format!(
            "TYPE: {}\nTRIGGERS: {}\nAPPROVED: {}\nFREQUENCY: {}\nAPPROVALS: {}\nREJECTIONS: {}\nLAST_SEEN: {}\n",
            stats.pattern.decision_type,
            triggers.join("+"),
            stats.pattern.user_approved,
            stats.pattern.frequency,
            stats.approvals,
            stats.rejections,
            stats.pattern.last_seen.to_rfc3339(),
        );
        if let Err(e) = self
            .store
            .store_record(PATTERN_CATEGORY, key, &payload, HashMap::new())
            .await
        {
            tracing::warn!(key = %key, error = %e, "could not persist consultation pattern");
        }
    }

    async fn persist_preference(&self, decision_type: DecisionType, preference: TypePreference) {
        let payload = format!(
            "TYPE: {}\nALWAYS_CONSULT: {}\nPROPENSITY: {}\n",
            decision_type, preference.always_consult, preference.propensity,
        );
        if let Err(e) = self
            .store
            .store_record(
                PREFERENCE_CATEGORY,
                &decision_type.to_string(),
                &payload,
                HashMap::new(),
            )
            .await
        {
            tracing::warn!(decision_type = %decision_type, error = %e, "could not persist preference");
        }
    }
}

fn marker_value(payload: &str, marker: &str) -> Option<String> {
    payload.lines().find_map(|line| {
        let trimmed = line.trim();
        trimmed
            .get(..marker.len())
            .filter(|prefix| prefix.eq_ignore_ascii_case(marker))
            .map(|_| trimmed[marker.len()..].trim().to_string())
    })
}

fn parse_type(value: &str) -> Option<DecisionType> {
    serde_json::from_str(&format!("\"{}\"", value.trim())).ok()
}

fn parse_pattern_payload(payload: &str) -> Option<PatternStats> {
    let decision_type = parse_type(&marker_value(payload, "TYPE:")?)?;
    let triggers: Vec<ConsultationTrigger> = marker_value(payload, "TRIGGERS:")?
        .split('+')
        .map(ConsultationTrigger::parse)
        .collect::<Option<Vec<_>>>()?;
    if triggers.is_empty() {
        return None;
    }
    let user_approved = marker_value(payload, "APPROVED:")?.parse().ok()?;
    let frequency = marker_value(payload, "FREQUENCY:")?.parse().ok()?;
    let approvals = marker_value(payload, "APPROVALS:")?.parse().ok()?;
    let rejections = marker_value(payload, "REJECTIONS:")?.parse().ok()?;
    let last_seen: DateTime<Utc> = marker_value(payload, "LAST_SEEN:")
        .and_then(|v| DateTime::parse_from_rfc3339(&v).ok())
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);

    Some(PatternStats {
        pattern: ConsultationPattern {
            decision_type,
            triggers,
            user_approved,
            frequency,
            last_seen,
        },
        approvals,
        rejections,
    })
}

fn parse_preference_payload(payload: &str) -> Option<(DecisionType, TypePreference)> {
    let decision_type = parse_type(&marker_value(payload, "TYPE:")?)?;
    let always_consult = marker_value(payload, "ALWAYS_CONSULT:")?.parse().ok()?;
    let propensity = marker_value(payload, "PROPENSITY:")?.parse().ok()?;
    Some((
        decision_type,
        TypePreference {
            always_consult,
            propensity,
        },
    ))
}
