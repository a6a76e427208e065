// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Injection formatter: markdown prepended to downstream prompts.
//!
//! Two sections, alerts first, then warnings; each sorted by
//! descending priority. Alerts show their days-to-expiry; patterns
//! render a `### [CATEGORY][failure mode][severity]` header with
//! bad-guidance / do-instead / applies-when bodies; principles carry
//! their BASELINE/DERIVED origin tag.

use crate::entities::{Pattern, Principle, ProvisionalAlert};

/// Milliseconds per day.
const DAY_MS: u64 = 24 * 60 * 60 * 1000;

/// Title cap inside pattern headers.
const TITLE_MAX: usize = 80;

/// Everything eligible for injection into one prompt.
#[derive(Debug, Clone, Default)]
pub struct InjectionInput {
    pub alerts: Vec<ProvisionalAlert>,
    pub patterns: Vec<Pattern>,
    pub principles: Vec<Principle>,
}

/// Render the injection block. Empty input renders an empty string.
pub fn format_injection(input: &InjectionInput, now_ms: u64) -> String {
    let mut out = String::new();

    if !input.alerts.is_empty() {
        let mut alerts: Vec<&ProvisionalAlert> = input.alerts.iter().collect();
        alerts.sort_by(|a, b| b.priority.cmp(&a.priority));

        out.push_str("## Active alerts\n\n");
        for alert in alerts {
            let days_left = alert.expires_at_ms.saturating_sub(now_ms) / DAY_MS;
            out.push_str(&format!("- {}\n", alert.message));
            out.push_str(&format!("  Expires in {} day(s).\n", days_left));
        }
        out.push('\n');
    }

    if !input.patterns.is_empty() || !input.principles.is_empty() {
        out.push_str("## Warnings from past findings\n\n");

        let mut patterns: Vec<&Pattern> = input.patterns.iter().collect();
        patterns.sort_by(|a, b| b.severity_max.cmp(&a.severity_max));
        for pattern in patterns {
            out.push_str(&format!(
                "### [{}][{}][{}] {}\n",
                pattern.finding_category.to_uppercase(),
                pattern.failure_mode,
                pattern.severity_max,
                truncate(&pattern.pattern_content, TITLE_MAX),
            ));
            out.push_str(&format!("- Bad guidance: {}\n", pattern.pattern_content));
            if !pattern.alternative.is_empty() {
                out.push_str(&format!("- Do instead: {}\n", pattern.alternative));
            }
            if !pattern.touches.is_empty() {
                let touches: Vec<String> =
                    pattern.touches.iter().map(|t| t.to_string()).collect();
                out.push_str(&format!("- Applies when touching: {}\n", touches.join(", ")));
            }
            out.push('\n');
        }

        let mut principles: Vec<&Principle> = input.principles.iter().collect();
        principles.sort_by(|a, b| b.priority.cmp(&a.priority));
        for principle in principles {
            out.push_str(&format!("- [{}] {}\n", principle.origin, principle.content));
        }
    }

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
#[path = "injection_tests.rs"]
mod tests;
