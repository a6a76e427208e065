// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! falcon-attribution: the deterministic attribution engine.
//!
//! Confirmed PR-review findings flow through this crate: evidence
//! extraction (an external model call behind [`EvidenceExtractor`]),
//! the pure failure-mode decision tree, the noncompliance checker,
//! provisional-alert promotion into durable patterns, prompt injection
//! formatting, and the kill-switch/maintenance machinery that keeps the
//! learned pattern store healthy.

mod entities;
mod error;
mod evidence;
mod extractor;
mod health;
mod injection;
mod invalidation;
mod killswitch;
mod maintenance;
mod noncompliance;
mod promoter;
mod resolver;
mod store;

pub use entities::{
    AlertId, AlertStatus, DocFingerprint, Occurrence, OccurrenceId, OccurrenceStatus, Pattern,
    PatternId, PatternStatus, Principle, PrincipleOrigin, ProvisionalAlert, SalienceIssue, Touch,
};
pub use error::AttributionError;
pub use evidence::{
    confidence_for_quote_type, CarrierInstructionKind, CarrierQuoteType, ConflictSignal,
    EvidenceBundle, SourceAgreement,
};
pub use extractor::{EvidenceExtractor, ExtractionInput, MockExtractor};
pub use health::{HealthThresholds, RollingHealth};
pub use injection::{format_injection, InjectionInput};
pub use invalidation::{handle_document_change, DocChange};
pub use killswitch::{KillSwitch, KillSwitchState, KillSwitchStatus};
pub use maintenance::{MaintenanceConfig, MaintenanceOutcome, MaintenanceRunner};
pub use noncompliance::{check_noncompliance, ExecutionNoncompliance, NoncomplianceCause};
pub use promoter::{promote_if_ready, GateDecision, PatternGate};
pub use resolver::{resolve_failure_mode, FailureMode, Resolution};
pub use store::AttributionStore;
