// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rolling health metrics over the attribution window.
//!
//! Computed from the last 30 days of occurrences. Three gauges feed the
//! kill switch:
//!
//! - `attribution_precision_score` (higher is better): share of
//!   occurrences from verbatim or paraphrase quotes — attributions
//!   anchored in real guidance text.
//! - `inferred_ratio` (lower is better): share of inferred-quote
//!   occurrences.
//! - `observed_improvement_rate` (higher is better): share of injected
//!   warnings that were adhered to.

use crate::entities::Occurrence;
use crate::evidence::CarrierQuoteType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rolling window length.
pub const HEALTH_WINDOW_MS: u64 = 30 * 24 * 60 * 60 * 1000;

/// Computed health over the rolling window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingHealth {
    pub attribution_precision_score: f64,
    pub inferred_ratio: f64,
    pub observed_improvement_rate: f64,
    /// Occurrence counts per quote class within the window.
    pub counts_by_kind: BTreeMap<String, u64>,
    pub window_total: u64,
    /// How many windowed occurrences were injected at all. The
    /// improvement gauge is meaningless when this is zero.
    pub injected_total: u64,
}

impl RollingHealth {
    /// Compute health from occurrences, considering only those within
    /// the window ending at `now_ms`.
    pub fn compute(occurrences: &[Occurrence], now_ms: u64) -> Self {
        let cutoff = now_ms.saturating_sub(HEALTH_WINDOW_MS);
        let windowed: Vec<&Occurrence> =
            occurrences.iter().filter(|o| o.created_at_ms >= cutoff).collect();

        let total = windowed.len() as u64;
        let mut counts_by_kind = BTreeMap::new();
        let mut inferred = 0u64;
        let mut injected = 0u64;
        let mut adhered = 0u64;
        for occurrence in &windowed {
            *counts_by_kind
                .entry(occurrence.quote_type.to_string())
                .or_insert(0) += 1;
            if occurrence.quote_type == CarrierQuoteType::Inferred {
                inferred += 1;
            }
            if occurrence.was_injected {
                injected += 1;
                if occurrence.was_adhered_to {
                    adhered += 1;
                }
            }
        }

        let ratio = |num: u64, den: u64| if den == 0 { 0.0 } else { num as f64 / den as f64 };
        Self {
            attribution_precision_score: ratio(total - inferred, total),
            inferred_ratio: ratio(inferred, total),
            observed_improvement_rate: ratio(adhered, injected),
            counts_by_kind,
            window_total: total,
            injected_total: injected,
        }
    }

    /// An empty window is healthy by definition.
    pub fn is_empty(&self) -> bool {
        self.window_total == 0
    }
}

/// Thresholds the gauges are held against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthThresholds {
    /// `attribution_precision_score` must stay at or above this.
    pub min_precision: f64,
    /// `inferred_ratio` must stay at or below this.
    pub max_inferred_ratio: f64,
    /// `observed_improvement_rate` must stay at or above this.
    pub min_improvement_rate: f64,
    /// Breach margin before auto-pause fires, as a fraction of the
    /// threshold (0.10 = 10%).
    pub margin: f64,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self { min_precision: 0.6, max_inferred_ratio: 0.5, min_improvement_rate: 0.2, margin: 0.10 }
    }
}

impl HealthThresholds {
    /// Metrics that breach their threshold by more than the margin.
    /// These trigger auto-pause.
    pub fn breaches(&self, health: &RollingHealth) -> Vec<String> {
        if health.is_empty() {
            return Vec::new();
        }
        let mut out = Vec::new();
        if health.attribution_precision_score < self.min_precision * (1.0 - self.margin) {
            out.push(format!(
                "attribution_precision_score {:.3} < {:.3}",
                health.attribution_precision_score,
                self.min_precision * (1.0 - self.margin)
            ));
        }
        if health.inferred_ratio > self.max_inferred_ratio * (1.0 + self.margin) {
            out.push(format!(
                "inferred_ratio {:.3} > {:.3}",
                health.inferred_ratio,
                self.max_inferred_ratio * (1.0 + self.margin)
            ));
        }
        if health.injected_total > 0
            && health.observed_improvement_rate < self.min_improvement_rate * (1.0 - self.margin)
        {
            out.push(format!(
                "observed_improvement_rate {:.3} < {:.3}",
                health.observed_improvement_rate,
                self.min_improvement_rate * (1.0 - self.margin)
            ));
        }
        out
    }

    /// True when every metric is within its plain threshold (no
    /// margin). Auto-resume requires this.
    pub fn all_within(&self, health: &RollingHealth) -> bool {
        if health.is_empty() {
            return true;
        }
        health.attribution_precision_score >= self.min_precision
            && health.inferred_ratio <= self.max_inferred_ratio
            && (health.injected_total == 0
                || health.observed_improvement_rate >= self.min_improvement_rate)
    }
}

#[cfg(test)]
#[path = "health_tests.rs"]
mod tests;
