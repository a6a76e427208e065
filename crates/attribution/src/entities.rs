// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Attribution entities: provisional alerts, patterns, occurrences,
//! principles, salience issues.
//!
//! These form a cyclic reference triangle (pattern ↔ occurrence ↔
//! alert); each entity holds IDs only and the store resolves lookups.
//! Back-pointers (`promoted_pattern_id`) are nullable and set in the
//! same store operation that creates the forward pointer.

use crate::evidence::CarrierQuoteType;
use crate::resolver::FailureMode;
use falcon_core::{CarrierStage, IssueId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

falcon_core::define_id! {
    /// Unique identifier for a provisional alert.
    pub struct AlertId("alr-");
}

falcon_core::define_id! {
    /// Unique identifier for a pattern definition.
    pub struct PatternId("pat-");
}

falcon_core::define_id! {
    /// Unique identifier for a pattern occurrence.
    pub struct OccurrenceId("occ-");
}

/// Coarse task-effect tags used to match patterns to tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Touch {
    Database,
    Authz,
    Network,
    Filesystem,
    Other,
}

impl fmt::Display for Touch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Touch::Database => "database",
            Touch::Authz => "authz",
            Touch::Network => "network",
            Touch::Filesystem => "filesystem",
            Touch::Other => "other",
        };
        write!(f, "{}", s)
    }
}

/// Lifecycle of a provisional alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Pending,
    Promoted,
    Expired,
}

/// A warning that has not yet earned pattern status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionalAlert {
    pub id: AlertId,
    pub message: String,
    pub finding_id: String,
    pub issue_id: IssueId,
    /// Captured from the evidence at alert creation so promotion can
    /// file the pattern without re-resolving.
    pub carrier_stage: CarrierStage,
    pub failure_mode: FailureMode,
    pub touches: BTreeSet<Touch>,
    pub file_patterns: Vec<String>,
    /// Injection ordering weight, highest first.
    pub priority: u8,
    pub expires_at_ms: u64,
    pub status: AlertStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promoted_pattern_id: Option<PatternId>,
    pub created_at_ms: u64,
}

impl ProvisionalAlert {
    pub fn new(
        message: impl Into<String>,
        finding_id: impl Into<String>,
        issue_id: IssueId,
        carrier_stage: CarrierStage,
        failure_mode: FailureMode,
        expires_at_ms: u64,
        now_ms: u64,
    ) -> Self {
        Self {
            id: AlertId::new(),
            message: message.into(),
            finding_id: finding_id.into(),
            issue_id,
            carrier_stage,
            failure_mode,
            touches: BTreeSet::new(),
            file_patterns: Vec::new(),
            priority: 0,
            expires_at_ms,
            status: AlertStatus::Pending,
            promoted_pattern_id: None,
            created_at_ms: now_ms,
        }
    }
}

/// Lifecycle of a pattern definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternStatus {
    Active,
    Archived,
}

/// A durable, reusable warning pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pattern {
    pub id: PatternId,
    /// Which carrier document the pattern warns about.
    pub carrier_stage: CarrierStage,
    /// The bad guidance to warn against.
    pub pattern_content: String,
    /// What to do instead.
    pub alternative: String,
    pub finding_category: String,
    pub failure_mode: FailureMode,
    /// Worst severity observed, 0..=10. Doubles as injection priority.
    pub severity_max: u8,
    pub touches: BTreeSet<Touch>,
    pub technologies: Vec<String>,
    /// In [0, 1]; decayed by maintenance, archived below threshold.
    pub confidence: f64,
    /// The quote class the pattern was promoted under; the kill switch
    /// uses it to gate creation.
    pub dominant_quote_type: CarrierQuoteType,
    pub status: PatternStatus,
    /// Permanent patterns never archive from decay.
    #[serde(default)]
    pub permanent: bool,
    pub created_at_ms: u64,
    pub last_decayed_at_ms: u64,
}

/// Fingerprint of the source document an occurrence was observed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocFingerprint {
    /// `git` | `external-tracker` | `web` | `external`
    pub kind: String,
    pub identifier: String,
    pub hash: String,
}

/// Lifecycle of an occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccurrenceStatus {
    Active,
    Inactive,
}

/// One observation of an alert or pattern in a carrier document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Occurrence {
    pub id: OccurrenceId,
    /// Set when the parent is (or became) a pattern.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_id: Option<PatternId>,
    /// Set while the parent is still a provisional alert.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_id: Option<AlertId>,
    pub issue_id: IssueId,
    pub fingerprint: DocFingerprint,
    /// Quote class of the evidence behind this occurrence. Confidence
    /// derives from this; occurrences store no confidence of their own.
    pub quote_type: CarrierQuoteType,
    pub was_injected: bool,
    pub was_adhered_to: bool,
    pub status: OccurrenceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inactive_reason: Option<String>,
    pub created_at_ms: u64,
}

impl Occurrence {
    pub fn for_alert(
        alert_id: AlertId,
        issue_id: IssueId,
        fingerprint: DocFingerprint,
        quote_type: CarrierQuoteType,
        now_ms: u64,
    ) -> Self {
        Self {
            id: OccurrenceId::new(),
            pattern_id: None,
            alert_id: Some(alert_id),
            issue_id,
            fingerprint,
            quote_type,
            was_injected: false,
            was_adhered_to: false,
            status: OccurrenceStatus::Active,
            inactive_reason: None,
            created_at_ms: now_ms,
        }
    }
}

/// Origin of a principle: shipped baseline or derived from patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrincipleOrigin {
    Baseline,
    Derived,
}

impl fmt::Display for PrincipleOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrincipleOrigin::Baseline => write!(f, "BASELINE"),
            PrincipleOrigin::Derived => write!(f, "DERIVED"),
        }
    }
}

/// A standing engineering principle injected alongside patterns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principle {
    pub content: String,
    pub origin: PrincipleOrigin,
    pub priority: u8,
}

/// A pattern whose warnings are being repeatedly ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalienceIssue {
    /// Stable hash of (carrier stage, first 100 chars, full content).
    pub key: String,
    pub pattern_id: PatternId,
    /// Injected-but-ignored occurrences in the rolling window.
    pub ignored_count: u64,
    pub first_seen_ms: u64,
    pub updated_at_ms: u64,
}
