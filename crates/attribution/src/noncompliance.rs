// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Noncompliance checker: guidance existed but was ignored.
//!
//! Only consulted when the resolver lands on `incomplete` or
//! `missing_reference` — the question is then whether the guidance was
//! actually present in a carrier document. A five-line sliding window
//! over each document is scored by unique keyword matches; context-pack
//! takes precedence over spec when both match. Ambiguity is deliberately
//! never a cause here: ambiguous guidance routes to a pattern
//! definition instead.

use crate::evidence::EvidenceBundle;
use crate::resolver::FailureMode;
use falcon_core::CarrierStage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Window height in lines.
const WINDOW_LINES: usize = 5;

/// Minimum unique keyword matches for a window to be a candidate.
const MIN_WINDOW_SCORE: usize = 2;

/// Minimum matched/total keyword ratio to report noncompliance.
const MIN_RELEVANCE: f64 = 0.3;

/// Excerpt cap in characters.
const EXCERPT_MAX: usize = 500;

/// Tokens carrying no signal for guidance matching.
const STOP_WORDS: [&str; 32] = [
    "the", "and", "for", "are", "but", "not", "with", "this", "that", "from", "into", "was",
    "were", "will", "would", "should", "could", "has", "have", "had", "been", "being", "its",
    "any", "all", "can", "may", "when", "where", "which", "while", "their",
];

/// Why guidance failed to land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoncomplianceCause {
    /// The guidance was present but too far from where the agent was
    /// looking.
    Salience,
    /// The guidance was present but formatted so it did not register.
    Formatting,
}

/// Guidance existed and was ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionNoncompliance {
    pub violated_guidance_stage: CarrierStage,
    /// `"Lines i..j"`, 1-based inclusive.
    pub violated_guidance_location: String,
    /// First 500 characters of the matched window.
    pub violated_guidance_excerpt: String,
    pub possible_causes: Vec<NoncomplianceCause>,
}

/// Check the carrier documents for guidance matching the finding.
///
/// `context_pack` and `spec` are the current carrier document contents,
/// when present.
pub fn check_noncompliance(
    finding_title: &str,
    finding_description: &str,
    context_pack: Option<&str>,
    spec: Option<&str>,
    evidence: &EvidenceBundle,
    failure_mode: FailureMode,
) -> Option<ExecutionNoncompliance> {
    if !matches!(failure_mode, FailureMode::Incomplete | FailureMode::MissingReference) {
        return None;
    }

    let keywords = extract_keywords(finding_title, finding_description);
    if keywords.is_empty() {
        return None;
    }

    // Context-pack precedence: checked first, and an equal-or-better
    // spec match cannot displace it.
    let candidates = [
        (CarrierStage::ContextPack, context_pack),
        (CarrierStage::Spec, spec),
    ];
    for (stage, content) in candidates {
        let Some(content) = content else { continue };
        let Some(window) = best_window(content, &keywords) else {
            continue;
        };
        let relevance = window.matched as f64 / keywords.len() as f64;
        if relevance < MIN_RELEVANCE {
            continue;
        }

        let location = format!("Lines {}..{}", window.start + 1, window.start + WINDOW_LINES);
        let mut causes = Vec::new();
        if !evidence.carrier_location.contains(&location) {
            causes.push(NoncomplianceCause::Salience);
        }
        if causes.is_empty() {
            causes.push(NoncomplianceCause::Formatting);
        }

        tracing::debug!(
            stage = %stage,
            %location,
            matched = window.matched,
            total = keywords.len(),
            "noncompliance detected"
        );
        return Some(ExecutionNoncompliance {
            violated_guidance_stage: stage,
            violated_guidance_location: location,
            violated_guidance_excerpt: truncate(&window.text, EXCERPT_MAX),
            possible_causes: causes,
        });
    }
    None
}

/// Lowercase, strip non-alphanumerics, split, drop stop words and
/// short tokens, de-duplicate.
pub(crate) fn extract_keywords(title: &str, description: &str) -> BTreeSet<String> {
    let text = format!("{} {}", title, description).to_lowercase();
    let cleaned: String = text
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();
    cleaned
        .split_whitespace()
        .filter(|t| t.len() > 2)
        .filter(|t| !STOP_WORDS.contains(t))
        .map(str::to_string)
        .collect()
}

struct WindowMatch {
    start: usize,
    matched: usize,
    text: String,
}

/// Best five-line window by unique keyword matches, score >= 2.
fn best_window(content: &str, keywords: &BTreeSet<String>) -> Option<WindowMatch> {
    let lines: Vec<&str> = content.lines().collect();
    if lines.is_empty() {
        return None;
    }

    let mut best: Option<WindowMatch> = None;
    let last_start = lines.len().saturating_sub(WINDOW_LINES);
    for start in 0..=last_start {
        let end = (start + WINDOW_LINES).min(lines.len());
        let window_text = lines[start..end].join("\n");
        let lowered = window_text.to_lowercase();
        let matched = keywords.iter().filter(|k| lowered.contains(k.as_str())).count();
        if matched < MIN_WINDOW_SCORE {
            continue;
        }
        if best.as_ref().map_or(true, |b| matched > b.matched) {
            best = Some(WindowMatch { start, matched, text: window_text });
        }
    }
    best
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}

#[cfg(test)]
#[path = "noncompliance_tests.rs"]
mod tests;
