// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daily maintenance: decay, expiry, salience, auto-resume.

use crate::entities::{AlertStatus, PatternStatus, SalienceIssue};
use crate::error::AttributionError;
use crate::health::RollingHealth;
use crate::killswitch::KillSwitch;
use crate::promoter::{promote_if_ready, PatternGate};
use crate::store::AttributionStore;
use falcon_core::Clock;
use sha2::{Digest, Sha256};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Milliseconds per day.
const DAY_MS: u64 = 24 * 60 * 60 * 1000;

/// Salience window.
const SALIENCE_WINDOW_MS: u64 = 30 * DAY_MS;

/// Maintenance tunables.
#[derive(Debug, Clone)]
pub struct MaintenanceConfig {
    /// Patterns untouched for this long start decaying.
    pub decay_after_days: u64,
    /// Confidence step removed per decay.
    pub decay_step: f64,
    /// Below this confidence, non-permanent patterns archive.
    pub archive_threshold: f64,
    /// Injected-but-ignored occurrences (30 days) that raise a
    /// salience issue.
    pub salience_threshold: usize,
    pub gate: PatternGate,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            decay_after_days: 30,
            decay_step: 0.05,
            archive_threshold: 0.3,
            salience_threshold: 3,
            gate: PatternGate::default(),
        }
    }
}

/// What one maintenance run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaintenanceOutcome {
    pub decayed: usize,
    pub archived: usize,
    pub expired_alerts: usize,
    pub promoted_alerts: usize,
    pub salience_issues: usize,
    pub auto_resumed: bool,
}

/// Runs the daily maintenance pass for one project scope.
pub struct MaintenanceRunner {
    store: AttributionStore,
    killswitch: KillSwitch,
    config: MaintenanceConfig,
}

impl MaintenanceRunner {
    pub fn new(store: AttributionStore, killswitch: KillSwitch, config: MaintenanceConfig) -> Self {
        Self { store, killswitch, config }
    }

    /// One daily pass. Order matters: expiry before promotion would
    /// drop alerts that just met the gate, so promotion runs first.
    pub fn run_daily(&self, now_ms: u64) -> Result<MaintenanceOutcome, AttributionError> {
        let mut outcome = MaintenanceOutcome::default();

        outcome.promoted_alerts = self.promote_ready_alerts(now_ms)?;
        outcome.expired_alerts = self.expire_alerts(now_ms)?;
        let (decayed, archived) = self.decay_patterns(now_ms)?;
        outcome.decayed = decayed;
        outcome.archived = archived;
        outcome.salience_issues = self.detect_salience(now_ms);

        let health = RollingHealth::compute(&self.store.occurrences(), now_ms);
        outcome.auto_resumed = self.killswitch.try_auto_resume(&health, now_ms);

        let day = chrono::DateTime::from_timestamp_millis(now_ms as i64)
            .map(|t| t.date_naive().to_string())
            .unwrap_or_default();
        tracing::info!(
            %day,
            promoted = outcome.promoted_alerts,
            expired = outcome.expired_alerts,
            decayed = outcome.decayed,
            archived = outcome.archived,
            salience = outcome.salience_issues,
            auto_resumed = outcome.auto_resumed,
            "daily maintenance finished"
        );
        Ok(outcome)
    }

    /// Tick forever on `period` (one day in production), running the
    /// daily pass each tick until cancelled. The first tick fires
    /// immediately so a restarted daemon catches up.
    pub async fn run_scheduled<C: Clock>(
        &self,
        clock: C,
        period: Duration,
        cancel: CancellationToken,
    ) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    if let Err(e) = self.run_daily(clock.epoch_ms()) {
                        tracing::warn!(error = %e, "maintenance pass failed");
                    }
                }
            }
        }
    }

    /// Early promotion for alerts that meet the gate before expiry.
    fn promote_ready_alerts(&self, now_ms: u64) -> Result<usize, AttributionError> {
        let mut promoted = 0;
        for alert in self.store.alerts_with_status(AlertStatus::Pending) {
            let result = promote_if_ready(
                &self.store,
                &self.killswitch,
                &self.config.gate,
                &alert.id,
                now_ms,
            )?;
            if result.is_some() {
                promoted += 1;
            }
        }
        Ok(promoted)
    }

    fn expire_alerts(&self, now_ms: u64) -> Result<usize, AttributionError> {
        let mut expired = 0;
        for mut alert in self.store.alerts_with_status(AlertStatus::Pending) {
            if now_ms >= alert.expires_at_ms {
                alert.status = AlertStatus::Expired;
                self.store.update_alert(alert)?;
                expired += 1;
            }
        }
        Ok(expired)
    }

    /// Decay confidence of patterns past the decay period; archive
    /// non-permanent patterns that fall below the threshold.
    fn decay_patterns(&self, now_ms: u64) -> Result<(usize, usize), AttributionError> {
        let decay_after_ms = self.config.decay_after_days * DAY_MS;
        let mut decayed = 0;
        let mut archived = 0;
        for mut pattern in self.store.patterns() {
            if pattern.status != PatternStatus::Active {
                continue;
            }
            if now_ms.saturating_sub(pattern.last_decayed_at_ms) < decay_after_ms {
                continue;
            }
            pattern.confidence = (pattern.confidence - self.config.decay_step).max(0.0);
            pattern.last_decayed_at_ms = now_ms;
            decayed += 1;
            if pattern.confidence < self.config.archive_threshold && !pattern.permanent {
                pattern.status = PatternStatus::Archived;
                archived += 1;
                tracing::info!(pattern_id = %pattern.id, confidence = pattern.confidence, "pattern archived by decay");
            }
            self.store.update_pattern(pattern)?;
        }
        Ok((decayed, archived))
    }

    /// Raise salience issues for patterns whose injected warnings were
    /// ignored at least `salience_threshold` times in the window.
    fn detect_salience(&self, now_ms: u64) -> usize {
        let cutoff = now_ms.saturating_sub(SALIENCE_WINDOW_MS);
        let mut raised = 0;
        for pattern in self.store.patterns() {
            if pattern.status != PatternStatus::Active {
                continue;
            }
            let ignored = self
                .store
                .occurrences_for_pattern(&pattern.id)
                .iter()
                .filter(|o| o.created_at_ms >= cutoff && o.was_injected && !o.was_adhered_to)
                .count();
            if ignored < self.config.salience_threshold {
                continue;
            }
            let key = salience_key(
                &pattern.carrier_stage.to_string(),
                &pattern.pattern_content,
            );
            self.store.upsert_salience(SalienceIssue {
                key,
                pattern_id: pattern.id,
                ignored_count: ignored as u64,
                first_seen_ms: now_ms,
                updated_at_ms: now_ms,
            });
            raised += 1;
        }
        raised
    }
}

/// Stable hash of (carrier stage, first 100 chars, full content).
pub(crate) fn salience_key(carrier_stage: &str, content: &str) -> String {
    let head: String = content.chars().take(100).collect();
    let mut hasher = Sha256::new();
    hasher.update(carrier_stage.as_bytes());
    hasher.update([0]);
    hasher.update(head.as_bytes());
    hasher.update([0]);
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
#[path = "maintenance_tests.rs"]
mod tests;
