// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Document-change invalidation.
//!
//! When a source document changes, occurrences fingerprinting it go
//! inactive (`superseded_doc`). Pattern definitions are never rewritten
//! here — confidence decay erodes them naturally afterwards.

use crate::store::AttributionStore;
use serde_json::Value;

/// Reason recorded on deactivated occurrences.
const SUPERSEDED: &str = "superseded_doc";

/// A change notification for one source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocChange {
    Git { repo: String, path: String },
    Tracker { doc_id: String },
    Web { url: String },
    External { external_id: String },
}

impl DocChange {
    /// Parse a tagged change payload. Unknown or malformed tags yield
    /// `None`, which handlers treat as a no-op.
    pub fn from_value(value: &Value) -> Option<Self> {
        let kind = value.get("kind").and_then(Value::as_str)?;
        let get = |field: &str| value.get(field).and_then(Value::as_str).map(str::to_string);
        match kind {
            "git" => Some(DocChange::Git { repo: get("repo")?, path: get("path")? }),
            "external-tracker" => Some(DocChange::Tracker { doc_id: get("docId")? }),
            "web" => Some(DocChange::Web { url: get("url")? }),
            "external" => Some(DocChange::External { external_id: get("externalId")? }),
            _ => None,
        }
    }

    /// Fingerprint kind string this change matches.
    pub fn kind(&self) -> &'static str {
        match self {
            DocChange::Git { .. } => "git",
            DocChange::Tracker { .. } => "external-tracker",
            DocChange::Web { .. } => "web",
            DocChange::External { .. } => "external",
        }
    }

    /// Fingerprint identifier this change matches.
    pub fn identifier(&self) -> String {
        match self {
            DocChange::Git { repo, path } => format!("{}#{}", repo, path),
            DocChange::Tracker { doc_id } => doc_id.clone(),
            DocChange::Web { url } => url.clone(),
            DocChange::External { external_id } => external_id.clone(),
        }
    }
}

/// Apply one document change: deactivate referencing occurrences.
/// Returns how many occurrences went inactive.
pub fn handle_document_change(store: &AttributionStore, change: &DocChange) -> usize {
    let changed =
        store.deactivate_by_fingerprint(change.kind(), &change.identifier(), SUPERSEDED);
    if changed > 0 {
        tracing::info!(
            kind = change.kind(),
            identifier = %change.identifier(),
            changed,
            "occurrences superseded by document change"
        );
    }
    changed
}

#[cfg(test)]
#[path = "invalidation_tests.rs"]
mod tests;
