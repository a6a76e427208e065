// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Evidence bundle produced by the extraction agent.
//!
//! The bundle is the sole input to the failure-mode resolver, so its
//! shape is the contract with the external model: camelCase fields,
//! a three-valued source-agreement, and free-text signal lists. The
//! core validates every inbound bundle; malformed JSON is rejected as
//! [`crate::AttributionError::Invalid`].

use crate::error::AttributionError;
use falcon_core::CarrierStage;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the carrier quote was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarrierQuoteType {
    Verbatim,
    Paraphrase,
    /// The extractor could not find explicit guidance; presumed absent.
    Inferred,
}

impl CarrierQuoteType {
    /// Occurrence confidence derived from the quote type.
    ///
    /// Occurrences store no confidence of their own; the promotion gate
    /// averages this fixed map. Deliberately not configurable.
    pub fn confidence(self) -> f64 {
        match self {
            CarrierQuoteType::Verbatim => 0.9,
            CarrierQuoteType::Paraphrase => 0.7,
            CarrierQuoteType::Inferred => 0.5,
        }
    }
}

impl fmt::Display for CarrierQuoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CarrierQuoteType::Verbatim => write!(f, "verbatim"),
            CarrierQuoteType::Paraphrase => write!(f, "paraphrase"),
            CarrierQuoteType::Inferred => write!(f, "inferred"),
        }
    }
}

/// Confidence for a quote-type string. Unknown values default to 0.5.
pub fn confidence_for_quote_type(s: &str) -> f64 {
    match s {
        "verbatim" => 0.9,
        "paraphrase" => 0.7,
        "inferred" => 0.5,
        _ => 0.5,
    }
}

/// What kind of instruction the carrier quote is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarrierInstructionKind {
    ExplicitlyHarmful,
    BenignButMissingGuardrails,
    Descriptive,
    Unknown,
}

/// Three-valued agreement between a cited source and the carrier.
///
/// Serialized as JSON `true` / `false` / `"unknown"` to match the
/// extraction agent's schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceAgreement {
    Agrees,
    Disagrees,
    #[default]
    Unknown,
}

impl Serialize for SourceAgreement {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SourceAgreement::Agrees => serializer.serialize_bool(true),
            SourceAgreement::Disagrees => serializer.serialize_bool(false),
            SourceAgreement::Unknown => serializer.serialize_str("unknown"),
        }
    }
}

impl<'de> Deserialize<'de> for SourceAgreement {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        match value {
            serde_json::Value::Bool(true) => Ok(SourceAgreement::Agrees),
            serde_json::Value::Bool(false) => Ok(SourceAgreement::Disagrees),
            serde_json::Value::Null => Ok(SourceAgreement::Unknown),
            serde_json::Value::String(s) if s == "unknown" => Ok(SourceAgreement::Unknown),
            other => Err(serde::de::Error::custom(format!(
                "expected true/false/\"unknown\", got {}",
                other
            ))),
        }
    }
}

/// A pair of documents in conflict about one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictSignal {
    pub doc_a: String,
    pub doc_b: String,
    pub topic: String,
    pub excerpt_a: String,
    pub excerpt_b: String,
}

/// Structured evidence for one finding against one carrier document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceBundle {
    pub carrier_stage: CarrierStage,
    pub carrier_quote: String,
    pub carrier_quote_type: CarrierQuoteType,
    pub carrier_instruction_kind: CarrierInstructionKind,
    /// Where in the carrier the quote sits, e.g. `"Lines 10..14"`.
    pub carrier_location: String,
    pub has_citation: bool,
    #[serde(default)]
    pub cited_sources: Vec<String>,
    #[serde(default)]
    pub source_retrievable: bool,
    #[serde(default)]
    pub source_agrees_with_carrier: SourceAgreement,
    #[serde(default)]
    pub mandatory_doc_missing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_doc_id: Option<String>,
    #[serde(default)]
    pub vagueness_signals: Vec<String>,
    #[serde(default)]
    pub has_testable_acceptance_criteria: bool,
    #[serde(default)]
    pub conflict_signals: Vec<ConflictSignal>,
}

impl EvidenceBundle {
    /// Validate a raw extraction response against the bundle schema.
    pub fn from_json(value: serde_json::Value) -> Result<Self, AttributionError> {
        serde_json::from_value(value).map_err(|e| AttributionError::Invalid(e.to_string()))
    }

    /// A minimal bundle for building test evidence.
    pub fn minimal(stage: CarrierStage, quote_type: CarrierQuoteType) -> Self {
        Self {
            carrier_stage: stage,
            carrier_quote: String::new(),
            carrier_quote_type: quote_type,
            carrier_instruction_kind: CarrierInstructionKind::Unknown,
            carrier_location: String::new(),
            has_citation: false,
            cited_sources: Vec::new(),
            source_retrievable: false,
            source_agrees_with_carrier: SourceAgreement::Unknown,
            mandatory_doc_missing: false,
            missing_doc_id: None,
            vagueness_signals: Vec::new(),
            has_testable_acceptance_criteria: false,
            conflict_signals: Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "evidence_tests.rs"]
mod tests;
