// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Kill switch gating pattern creation.
//!
//! Injection of existing patterns is never gated — only the creation of
//! new ones. State transitions are recorded with monotonic timestamps;
//! pausing an already-paused project is a no-op that does not shorten
//! the auto-resume timer.

use crate::error::AttributionError;
use crate::evidence::CarrierQuoteType;
use crate::health::{HealthThresholds, RollingHealth};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Auto-pauses re-evaluate after one day.
const AUTO_RESUME_DELAY_MS: u64 = 24 * 60 * 60 * 1000;

/// Creation gate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KillSwitchState {
    /// All pattern creation allowed.
    Active,
    /// Verbatim and paraphrase patterns still create; inferred are
    /// logged only.
    InferredPaused,
    /// No pattern saved at all.
    FullyPaused,
}

impl fmt::Display for KillSwitchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            KillSwitchState::Active => "active",
            KillSwitchState::InferredPaused => "inferred_paused",
            KillSwitchState::FullyPaused => "fully_paused",
        };
        write!(f, "{}", s)
    }
}

/// Current status for one (workspace, project) scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KillSwitchStatus {
    pub state: KillSwitchState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_resume_at_ms: Option<u64>,
    /// Whether the last pause came from health evaluation rather than
    /// an operator.
    pub auto_triggered: bool,
    pub changed_at_ms: u64,
}

impl KillSwitchStatus {
    fn active(now_ms: u64) -> Self {
        Self {
            state: KillSwitchState::Active,
            reason: None,
            auto_resume_at_ms: None,
            auto_triggered: false,
            changed_at_ms: now_ms,
        }
    }
}

/// Kill switch for one project scope.
#[derive(Clone)]
pub struct KillSwitch {
    status: Arc<Mutex<KillSwitchStatus>>,
    thresholds: HealthThresholds,
}

impl KillSwitch {
    pub fn new(thresholds: HealthThresholds, now_ms: u64) -> Self {
        Self { status: Arc::new(Mutex::new(KillSwitchStatus::active(now_ms))), thresholds }
    }

    pub fn status(&self) -> KillSwitchStatus {
        self.status.lock().clone()
    }

    pub fn thresholds(&self) -> &HealthThresholds {
        &self.thresholds
    }

    /// Whether a pattern of `quote_class` may be created right now.
    /// `Err` carries the denial reason for logging.
    pub fn allows_pattern_creation(&self, quote_class: CarrierQuoteType) -> Result<(), String> {
        let status = self.status.lock();
        match status.state {
            KillSwitchState::Active => Ok(()),
            KillSwitchState::InferredPaused => {
                if quote_class == CarrierQuoteType::Inferred {
                    Err(format!(
                        "inferred pattern creation paused ({})",
                        status.reason.as_deref().unwrap_or("no reason recorded")
                    ))
                } else {
                    Ok(())
                }
            }
            KillSwitchState::FullyPaused => Err(format!(
                "all pattern creation paused ({})",
                status.reason.as_deref().unwrap_or("no reason recorded")
            )),
        }
    }

    /// Manual pause. A reason is mandatory. Pausing an already-paused
    /// scope is a no-op and keeps the existing auto-resume timer.
    pub fn pause(
        &self,
        state: KillSwitchState,
        reason: &str,
        now_ms: u64,
    ) -> Result<(), AttributionError> {
        if state == KillSwitchState::Active {
            return Err(AttributionError::Conflict("pause cannot target active".to_string()));
        }
        if reason.trim().is_empty() {
            return Err(AttributionError::Conflict("pause requires a reason".to_string()));
        }
        let mut status = self.status.lock();
        if status.state == state {
            tracing::info!(state = %state, "pause is a no-op: already in state");
            return Ok(());
        }
        debug_assert!(now_ms >= status.changed_at_ms);
        *status = KillSwitchStatus {
            state,
            reason: Some(reason.to_string()),
            auto_resume_at_ms: None,
            auto_triggered: false,
            changed_at_ms: now_ms,
        };
        tracing::warn!(state = %state, reason, "pattern creation paused");
        Ok(())
    }

    /// Manual resume. Refuses when the last pause was auto-triggered
    /// unless `force` is set.
    pub fn resume(&self, force: bool, now_ms: u64) -> Result<(), AttributionError> {
        let mut status = self.status.lock();
        if status.state == KillSwitchState::Active {
            return Ok(());
        }
        if status.auto_triggered && !force {
            return Err(AttributionError::Conflict(
                "last pause was auto-triggered; use --force to override".to_string(),
            ));
        }
        *status = KillSwitchStatus::active(now_ms);
        tracing::info!("pattern creation resumed");
        Ok(())
    }

    /// Evaluate rolling health; auto-pause on any breach beyond the
    /// margin. Returns the breaches that fired the pause.
    pub fn evaluate_health(&self, health: &RollingHealth, now_ms: u64) -> Vec<String> {
        let breaches = self.thresholds.breaches(health);
        if breaches.is_empty() {
            return breaches;
        }
        let mut status = self.status.lock();
        if status.state != KillSwitchState::Active {
            return breaches;
        }
        *status = KillSwitchStatus {
            state: KillSwitchState::FullyPaused,
            reason: Some(format!("health breach: {}", breaches.join("; "))),
            auto_resume_at_ms: Some(now_ms + AUTO_RESUME_DELAY_MS),
            auto_triggered: true,
            changed_at_ms: now_ms,
        };
        tracing::warn!(?breaches, "kill switch auto-paused");
        breaches
    }

    /// Auto-resume when due and every metric is back within thresholds.
    /// Returns true when the switch resumed.
    pub fn try_auto_resume(&self, health: &RollingHealth, now_ms: u64) -> bool {
        let mut status = self.status.lock();
        if !status.auto_triggered || status.state == KillSwitchState::Active {
            return false;
        }
        let due = status.auto_resume_at_ms.map_or(false, |at| now_ms >= at);
        if !due || !self.thresholds.all_within(health) {
            return false;
        }
        *status = KillSwitchStatus::active(now_ms);
        tracing::info!("kill switch auto-resumed: health back within thresholds");
        true
    }
}

#[cfg(test)]
#[path = "killswitch_tests.rs"]
mod tests;
