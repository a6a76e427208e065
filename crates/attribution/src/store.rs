// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory attribution store.
//!
//! Single-writer by construction: every mutation takes the table lock
//! for its whole read-modify-write. Readers get cloned snapshots taken
//! at call start. Cross-entity links (alert ↔ occurrence ↔ pattern)
//! are ID-valued and resolved here.

use crate::entities::{
    AlertId, AlertStatus, Occurrence, OccurrenceId, OccurrenceStatus, Pattern, PatternId,
    ProvisionalAlert, SalienceIssue,
};
use crate::error::AttributionError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Shared store for alerts, patterns, occurrences, salience issues.
#[derive(Clone, Default)]
pub struct AttributionStore {
    inner: Arc<Tables>,
}

#[derive(Default)]
struct Tables {
    alerts: RwLock<HashMap<AlertId, ProvisionalAlert>>,
    patterns: RwLock<HashMap<PatternId, Pattern>>,
    occurrences: RwLock<HashMap<OccurrenceId, Occurrence>>,
    salience: RwLock<HashMap<String, SalienceIssue>>,
}

impl AttributionStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -- alerts --

    pub fn insert_alert(&self, alert: ProvisionalAlert) {
        self.inner.alerts.write().insert(alert.id, alert);
    }

    pub fn alert(&self, id: &AlertId) -> Result<ProvisionalAlert, AttributionError> {
        self.inner
            .alerts
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| AttributionError::NotFound { entity: "alert", id: id.to_string() })
    }

    pub fn update_alert(&self, alert: ProvisionalAlert) -> Result<(), AttributionError> {
        let mut alerts = self.inner.alerts.write();
        if !alerts.contains_key(&alert.id) {
            return Err(AttributionError::NotFound { entity: "alert", id: alert.id.to_string() });
        }
        alerts.insert(alert.id, alert);
        Ok(())
    }

    pub fn alerts_with_status(&self, status: AlertStatus) -> Vec<ProvisionalAlert> {
        self.inner
            .alerts
            .read()
            .values()
            .filter(|a| a.status == status)
            .cloned()
            .collect()
    }

    // -- patterns --

    pub fn insert_pattern(&self, pattern: Pattern) {
        self.inner.patterns.write().insert(pattern.id, pattern);
    }

    pub fn pattern(&self, id: &PatternId) -> Result<Pattern, AttributionError> {
        self.inner
            .patterns
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| AttributionError::NotFound { entity: "pattern", id: id.to_string() })
    }

    pub fn update_pattern(&self, pattern: Pattern) -> Result<(), AttributionError> {
        let mut patterns = self.inner.patterns.write();
        if !patterns.contains_key(&pattern.id) {
            return Err(AttributionError::NotFound {
                entity: "pattern",
                id: pattern.id.to_string(),
            });
        }
        patterns.insert(pattern.id, pattern);
        Ok(())
    }

    pub fn patterns(&self) -> Vec<Pattern> {
        self.inner.patterns.read().values().cloned().collect()
    }

    // -- occurrences --

    pub fn insert_occurrence(&self, occurrence: Occurrence) {
        self.inner.occurrences.write().insert(occurrence.id, occurrence);
    }

    pub fn occurrence(&self, id: &OccurrenceId) -> Result<Occurrence, AttributionError> {
        self.inner.occurrences.read().get(id).cloned().ok_or_else(|| {
            AttributionError::NotFound { entity: "occurrence", id: id.to_string() }
        })
    }

    pub fn update_occurrence(&self, occurrence: Occurrence) -> Result<(), AttributionError> {
        let mut occurrences = self.inner.occurrences.write();
        if !occurrences.contains_key(&occurrence.id) {
            return Err(AttributionError::NotFound {
                entity: "occurrence",
                id: occurrence.id.to_string(),
            });
        }
        occurrences.insert(occurrence.id, occurrence);
        Ok(())
    }

    pub fn occurrences_for_alert(&self, alert: &AlertId) -> Vec<Occurrence> {
        let mut out: Vec<Occurrence> = self
            .inner
            .occurrences
            .read()
            .values()
            .filter(|o| o.alert_id == Some(*alert))
            .cloned()
            .collect();
        out.sort_by_key(|o| o.created_at_ms);
        out
    }

    pub fn occurrences_for_pattern(&self, pattern: &PatternId) -> Vec<Occurrence> {
        let mut out: Vec<Occurrence> = self
            .inner
            .occurrences
            .read()
            .values()
            .filter(|o| o.pattern_id == Some(*pattern))
            .cloned()
            .collect();
        out.sort_by_key(|o| o.created_at_ms);
        out
    }

    pub fn occurrences(&self) -> Vec<Occurrence> {
        self.inner.occurrences.read().values().cloned().collect()
    }

    /// Relink every occurrence of `alert` to `pattern` in one write.
    ///
    /// Runs under the same table lock that set the alert's forward
    /// pointer, so readers never observe a half-linked triangle.
    pub fn relink_alert_occurrences(&self, alert: &AlertId, pattern: PatternId) -> usize {
        let mut occurrences = self.inner.occurrences.write();
        let mut moved = 0;
        for occurrence in occurrences.values_mut() {
            if occurrence.alert_id == Some(*alert) {
                occurrence.pattern_id = Some(pattern);
                moved += 1;
            }
        }
        moved
    }

    /// Mark occurrences inactive whose fingerprint references the given
    /// document. Returns how many changed.
    pub fn deactivate_by_fingerprint(
        &self,
        kind: &str,
        identifier: &str,
        reason: &str,
    ) -> usize {
        let mut occurrences = self.inner.occurrences.write();
        let mut changed = 0;
        for occurrence in occurrences.values_mut() {
            if occurrence.status == OccurrenceStatus::Active
                && occurrence.fingerprint.kind == kind
                && occurrence.fingerprint.identifier == identifier
            {
                occurrence.status = OccurrenceStatus::Inactive;
                occurrence.inactive_reason = Some(reason.to_string());
                changed += 1;
            }
        }
        changed
    }

    // -- salience --

    pub fn upsert_salience(&self, mut issue: SalienceIssue) {
        let mut salience = self.inner.salience.write();
        if let Some(existing) = salience.get(&issue.key) {
            issue.first_seen_ms = existing.first_seen_ms;
        }
        salience.insert(issue.key.clone(), issue);
    }

    pub fn salience_issues(&self) -> Vec<SalienceIssue> {
        self.inner.salience.read().values().cloned().collect()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
