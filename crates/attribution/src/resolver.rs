// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic failure-mode resolver.
//!
//! A pure decision tree over the evidence bundle: first match wins,
//! with a carrier-kind default at the end. When the ambiguity and
//! incompleteness scores tie, the resolver falls through to the
//! default rather than breaking the tie.

use crate::evidence::{CarrierInstructionKind, CarrierQuoteType, EvidenceBundle, SourceAgreement};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a carrier document led an agent astray.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    /// Carrier distorts the meaning of the source it cites.
    SynthesisDrift,
    Incorrect,
    MissingReference,
    ConflictUnresolved,
    Ambiguous,
    Incomplete,
}

impl fmt::Display for FailureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureMode::SynthesisDrift => "synthesis_drift",
            FailureMode::Incorrect => "incorrect",
            FailureMode::MissingReference => "missing_reference",
            FailureMode::ConflictUnresolved => "conflict_unresolved",
            FailureMode::Ambiguous => "ambiguous",
            FailureMode::Incomplete => "incomplete",
        };
        write!(f, "{}", s)
    }
}

/// Resolver output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub failure_mode: FailureMode,
    /// Additive adjustment applied to derived confidence.
    pub confidence_modifier: f64,
    pub suspected_synthesis_drift: bool,
    pub reasoning: String,
}

impl Resolution {
    fn new(failure_mode: FailureMode, reasoning: impl Into<String>) -> Self {
        Self {
            failure_mode,
            confidence_modifier: 0.0,
            suspected_synthesis_drift: false,
            reasoning: reasoning.into(),
        }
    }
}

/// Resolve the failure mode for one evidence bundle.
///
/// Pure: equal bundles always resolve identically.
pub fn resolve_failure_mode(evidence: &EvidenceBundle) -> Resolution {
    // 1. Proven synthesis drift: the cited source exists and disagrees.
    if evidence.has_citation
        && evidence.source_retrievable
        && evidence.source_agrees_with_carrier == SourceAgreement::Disagrees
    {
        return Resolution::new(
            FailureMode::SynthesisDrift,
            "cited source retrieved and contradicts the carrier",
        );
    }

    // 2. Suspected drift: a citation that cannot be checked.
    if evidence.has_citation && !evidence.source_retrievable {
        let mut resolution = Resolution::new(
            FailureMode::Incorrect,
            "citation present but source not retrievable",
        );
        resolution.suspected_synthesis_drift = true;
        resolution.confidence_modifier = -0.15;
        return resolution;
    }

    // 3. A mandatory document never made it into the carrier's inputs.
    if evidence.mandatory_doc_missing {
        return Resolution::new(FailureMode::MissingReference, "mandatory document missing");
    }

    // 4. The inputs contradict each other and the carrier chose silently.
    if !evidence.conflict_signals.is_empty() {
        return Resolution::new(
            FailureMode::ConflictUnresolved,
            format!("{} unresolved conflict signal(s)", evidence.conflict_signals.len()),
        );
    }

    // 5. Ambiguity vs incompleteness scoring. Ties fall through.
    let ambiguity = ambiguity_score(evidence);
    let incompleteness = incompleteness_score(evidence);
    if ambiguity > incompleteness && ambiguity >= 2 {
        return Resolution::new(
            FailureMode::Ambiguous,
            format!("ambiguity {} > incompleteness {}", ambiguity, incompleteness),
        );
    }
    if incompleteness > ambiguity && incompleteness >= 2 {
        return Resolution::new(
            FailureMode::Incomplete,
            format!("incompleteness {} > ambiguity {}", incompleteness, ambiguity),
        );
    }

    // 6. Default on the carrier instruction kind.
    if matches!(
        evidence.carrier_quote_type,
        CarrierQuoteType::Verbatim | CarrierQuoteType::Paraphrase
    ) {
        let mode = match evidence.carrier_instruction_kind {
            CarrierInstructionKind::ExplicitlyHarmful => FailureMode::Incorrect,
            CarrierInstructionKind::BenignButMissingGuardrails
            | CarrierInstructionKind::Descriptive
            | CarrierInstructionKind::Unknown => FailureMode::Incomplete,
        };
        return Resolution::new(mode, "default on carrier instruction kind");
    }
    Resolution::new(FailureMode::Incomplete, "inferred quote, default incomplete")
}

/// Vagueness bucket plus a point for missing acceptance criteria.
fn ambiguity_score(evidence: &EvidenceBundle) -> u32 {
    let vagueness = match evidence.vagueness_signals.len() {
        n if n >= 3 => 3,
        2 => 2,
        1 => 1,
        _ => 0,
    };
    vagueness + u32::from(!evidence.has_testable_acceptance_criteria)
}

fn incompleteness_score(evidence: &EvidenceBundle) -> u32 {
    let mut score = 0;
    if evidence.carrier_quote_type == CarrierQuoteType::Inferred {
        score += 3;
    }
    if evidence.has_citation && !evidence.cited_sources.is_empty() {
        score += 1;
    }
    if evidence.vagueness_signals.is_empty()
        && evidence.carrier_quote_type != CarrierQuoteType::Inferred
    {
        score += 1;
    }
    score
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
