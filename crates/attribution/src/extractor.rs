// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Evidence extraction seam.
//!
//! The production extractor is an external model call outside this
//! workspace; the core validates whatever comes back and rejects
//! malformed bundles. [`MockExtractor`] serves deterministic tests with
//! a fixed response table keyed by finding id.

use crate::error::AttributionError;
use crate::evidence::EvidenceBundle;
use async_trait::async_trait;
use std::collections::HashMap;

/// Input to one extraction call.
#[derive(Debug, Clone)]
pub struct ExtractionInput {
    pub finding_id: String,
    pub finding_title: String,
    pub finding_description: String,
    /// Current carrier documents, when present.
    pub context_pack: Option<String>,
    pub spec: Option<String>,
}

/// Produces a structured evidence bundle for a finding.
#[async_trait]
pub trait EvidenceExtractor: Send + Sync {
    /// Extract evidence. Transport failures are `Retryable`; schema
    /// violations are `Invalid`. The engine never retries internally.
    async fn extract(&self, input: &ExtractionInput) -> Result<EvidenceBundle, AttributionError>;
}

/// Deterministic extractor backed by a fixed response table.
#[derive(Default)]
pub struct MockExtractor {
    responses: HashMap<String, serde_json::Value>,
    fallback: Option<serde_json::Value>,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the raw JSON returned for `finding_id`.
    pub fn with_response(mut self, finding_id: impl Into<String>, raw: serde_json::Value) -> Self {
        self.responses.insert(finding_id.into(), raw);
        self
    }

    /// Raw JSON returned for any finding without a specific entry.
    pub fn with_fallback(mut self, raw: serde_json::Value) -> Self {
        self.fallback = Some(raw);
        self
    }
}

#[async_trait]
impl EvidenceExtractor for MockExtractor {
    async fn extract(&self, input: &ExtractionInput) -> Result<EvidenceBundle, AttributionError> {
        let raw = self
            .responses
            .get(&input.finding_id)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| {
                AttributionError::Retryable(format!("no mock response for {}", input.finding_id))
            })?;
        // Same validation path the production extractor goes through.
        EvidenceBundle::from_json(raw)
    }
}

#[cfg(test)]
#[path = "extractor_tests.rs"]
mod tests;
