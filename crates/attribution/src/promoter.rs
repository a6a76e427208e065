// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Alert promotion: provisional alert → durable pattern.
//!
//! Called on every occurrence creation linked to an alert, and again by
//! daily maintenance for early promotion. A refused gate is not an
//! error — it is logged with the blocking reason.

use crate::entities::{
    AlertStatus, Occurrence, Pattern, PatternId, PatternStatus, ProvisionalAlert,
};
use crate::error::AttributionError;
use crate::evidence::CarrierQuoteType;
use crate::killswitch::KillSwitch;
use crate::store::AttributionStore;

/// Milliseconds per day.
const DAY_MS: u64 = 24 * 60 * 60 * 1000;

/// Thresholds an alert must clear to become a pattern.
#[derive(Debug, Clone)]
pub struct PatternGate {
    pub min_occurrences: usize,
    pub min_unique_issues: usize,
    pub min_confidence: f64,
    pub max_days_old: u64,
}

impl Default for PatternGate {
    fn default() -> Self {
        Self { min_occurrences: 3, min_unique_issues: 2, min_confidence: 0.70, max_days_old: 90 }
    }
}

/// Gate evaluation result with the blocking reasons when unmet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateDecision {
    pub met: bool,
    pub blocking: Vec<String>,
}

impl PatternGate {
    /// Evaluate the gate for an alert and its occurrences.
    pub fn evaluate(
        &self,
        alert: &ProvisionalAlert,
        occurrences: &[Occurrence],
        now_ms: u64,
    ) -> GateDecision {
        let mut blocking = Vec::new();

        if occurrences.len() < self.min_occurrences {
            blocking.push(format!(
                "occurrences {} < {}",
                occurrences.len(),
                self.min_occurrences
            ));
        }

        let mut issues: Vec<_> = occurrences.iter().map(|o| o.issue_id).collect();
        issues.sort();
        issues.dedup();
        if issues.len() < self.min_unique_issues {
            blocking.push(format!("unique issues {} < {}", issues.len(), self.min_unique_issues));
        }

        let avg = average_confidence(occurrences);
        if avg < self.min_confidence {
            blocking.push(format!("avg confidence {:.3} < {:.2}", avg, self.min_confidence));
        }

        let oldest = occurrences
            .iter()
            .map(|o| o.created_at_ms)
            .min()
            .unwrap_or(alert.created_at_ms);
        let age_days = now_ms.saturating_sub(oldest) / DAY_MS;
        if age_days > self.max_days_old {
            blocking.push(format!("oldest occurrence {}d > {}d", age_days, self.max_days_old));
        }

        GateDecision { met: blocking.is_empty(), blocking }
    }
}

/// Average occurrence confidence via the fixed quote-type map.
pub fn average_confidence(occurrences: &[Occurrence]) -> f64 {
    if occurrences.is_empty() {
        return 0.0;
    }
    let total: f64 = occurrences.iter().map(|o| o.quote_type.confidence()).sum();
    total / occurrences.len() as f64
}

/// The quote class a promoted pattern is filed under: the most common
/// class among its occurrences, ties resolved toward the less
/// trustworthy class.
fn dominant_quote_type(occurrences: &[Occurrence]) -> CarrierQuoteType {
    let mut counts = [0usize; 3];
    for occurrence in occurrences {
        let idx = match occurrence.quote_type {
            CarrierQuoteType::Verbatim => 0,
            CarrierQuoteType::Paraphrase => 1,
            CarrierQuoteType::Inferred => 2,
        };
        counts[idx] += 1;
    }
    // Scan inferred-first so ties pick the weaker class.
    if counts[2] >= counts[1] && counts[2] >= counts[0] {
        CarrierQuoteType::Inferred
    } else if counts[1] >= counts[0] {
        CarrierQuoteType::Paraphrase
    } else {
        CarrierQuoteType::Verbatim
    }
}

/// Promote `alert` if the gate is met and the kill switch allows it.
///
/// Returns the new pattern id on promotion, `None` when the gate or the
/// kill switch blocks. Already-promoted alerts are a `Conflict`.
pub fn promote_if_ready(
    store: &AttributionStore,
    killswitch: &KillSwitch,
    gate: &PatternGate,
    alert_id: &crate::entities::AlertId,
    now_ms: u64,
) -> Result<Option<PatternId>, AttributionError> {
    let mut alert = store.alert(alert_id)?;
    if alert.status == AlertStatus::Promoted {
        return Err(AttributionError::Conflict(format!("alert already promoted: {}", alert.id)));
    }

    let occurrences = store.occurrences_for_alert(alert_id);
    let decision = gate.evaluate(&alert, &occurrences, now_ms);
    if !decision.met {
        tracing::info!(
            alert_id = %alert.id,
            blocking = ?decision.blocking,
            "promotion gate not met"
        );
        return Ok(None);
    }

    let quote_class = dominant_quote_type(&occurrences);
    if let Err(reason) = killswitch.allows_pattern_creation(quote_class) {
        tracing::warn!(alert_id = %alert.id, %reason, "promotion denied by kill switch");
        return Ok(None);
    }

    let pattern = Pattern {
        id: PatternId::new(),
        carrier_stage: alert.carrier_stage,
        pattern_content: alert.message.clone(),
        alternative: String::new(),
        finding_category: alert.finding_id.clone(),
        failure_mode: alert.failure_mode,
        severity_max: alert.priority,
        touches: alert.touches.clone(),
        technologies: Vec::new(),
        confidence: average_confidence(&occurrences),
        dominant_quote_type: quote_class,
        status: PatternStatus::Active,
        permanent: false,
        created_at_ms: now_ms,
        last_decayed_at_ms: now_ms,
    };
    let pattern_id = pattern.id;

    store.insert_pattern(pattern);
    let moved = store.relink_alert_occurrences(alert_id, pattern_id);
    alert.status = AlertStatus::Promoted;
    alert.promoted_pattern_id = Some(pattern_id);
    store.update_alert(alert)?;

    tracing::info!(%alert_id, %pattern_id, moved, "alert promoted to pattern");
    Ok(Some(pattern_id))
}

#[cfg(test)]
#[path = "promoter_tests.rs"]
mod tests;
