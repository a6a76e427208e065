// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared domain error kinds.
//!
//! Only the kinds raised by pure domain logic live here. Effectful
//! failures (dirty worktrees, subprocess timeouts, oversized prompts,
//! malformed attribution responses) are defined in the crate that
//! raises them and wrap [`CoreError`] where they need to.

use thiserror::Error;

/// Errors raised by domain-level validation and state transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Referenced entity absent.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Input constraint breach. Reports the field and the constraint.
    #[error("validation failed for `{field}`: {constraint}")]
    Validation { field: &'static str, constraint: String },

    /// Slug taken, duplicate identity, already-promoted alert.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Agent FSM precondition unmet (agent already bound to an issue).
    #[error("agent busy: {0}")]
    AgentBusy(String),

    /// Stage or lifecycle transition disallowed.
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
}

impl CoreError {
    /// Convenience constructor for validation failures.
    pub fn validation(field: &'static str, constraint: impl Into<String>) -> Self {
        Self::Validation { field, constraint: constraint.into() }
    }

    /// Convenience constructor for invalid transitions.
    pub fn invalid_transition(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::InvalidTransition { from: from.into(), to: to.into() }
    }
}
