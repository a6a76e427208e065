// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-agent lifecycle state machine.
//!
//! The lifecycle is a pure value state. Side effects (worktree checkout,
//! subprocess spawn) are performed by the dispatcher and reflected here
//! only on success. `issue_id` is non-null exactly while the agent holds
//! an issue (Checkout or Working).

use crate::error::CoreError;
use crate::issue::IssueId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Phases an agent moves through while serving dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentPhase {
    /// Registered but not yet released into the pool
    Init,
    /// Available for dispatch
    Idle,
    /// Worktree checkout in progress for a bound issue
    Checkout,
    /// Subprocess running for a bound issue
    Working,
    /// Last run finished successfully; awaiting release
    Done,
    /// Last run failed; awaiting explicit release
    Error,
}

impl fmt::Display for AgentPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AgentPhase::Init => "init",
            AgentPhase::Idle => "idle",
            AgentPhase::Checkout => "checkout",
            AgentPhase::Working => "working",
            AgentPhase::Done => "done",
            AgentPhase::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// Value-state for one agent's lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentLifecycle {
    phase: AgentPhase,
    issue_id: Option<IssueId>,
    last_error: Option<String>,
}

impl AgentLifecycle {
    /// A freshly registered agent, not yet in the pool.
    pub fn new() -> Self {
        Self { phase: AgentPhase::Init, issue_id: None, last_error: None }
    }

    pub fn phase(&self) -> AgentPhase {
        self.phase
    }

    /// The issue currently bound, if any. `Some` iff phase is
    /// Checkout or Working.
    pub fn issue_id(&self) -> Option<IssueId> {
        self.issue_id
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Explicit release back into the pool. Legal from Init, Done and
    /// Error; clears the bound issue and the recorded error.
    pub fn release(&mut self) -> Result<(), CoreError> {
        match self.phase {
            AgentPhase::Init | AgentPhase::Done | AgentPhase::Error => {
                self.phase = AgentPhase::Idle;
                self.issue_id = None;
                self.last_error = None;
                Ok(())
            }
            from => Err(CoreError::invalid_transition(from.to_string(), "idle")),
        }
    }

    /// Bind an issue and begin worktree checkout. Only legal from Idle.
    pub fn begin_checkout(&mut self, issue_id: IssueId) -> Result<(), CoreError> {
        match self.phase {
            AgentPhase::Idle => {
                self.phase = AgentPhase::Checkout;
                self.issue_id = Some(issue_id);
                Ok(())
            }
            AgentPhase::Working => Err(CoreError::AgentBusy(format!(
                "already working on issue {}",
                self.issue_id.map(|i| i.to_string()).unwrap_or_default()
            ))),
            from => Err(CoreError::invalid_transition(from.to_string(), "checkout")),
        }
    }

    /// Checkout finished; the subprocess is about to start.
    pub fn begin_work(&mut self) -> Result<(), CoreError> {
        match self.phase {
            AgentPhase::Checkout => {
                self.phase = AgentPhase::Working;
                Ok(())
            }
            from => Err(CoreError::invalid_transition(from.to_string(), "working")),
        }
    }

    /// Subprocess exited successfully. The issue binding is dropped here,
    /// not at release: the binding tracks work in flight, not history.
    pub fn complete(&mut self) -> Result<(), CoreError> {
        match self.phase {
            AgentPhase::Working => {
                self.phase = AgentPhase::Done;
                self.issue_id = None;
                Ok(())
            }
            from => Err(CoreError::invalid_transition(from.to_string(), "done")),
        }
    }

    /// Record a failure. Legal from any phase. Drops the issue binding
    /// (nothing is in flight any more) but keeps the error until release.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.phase = AgentPhase::Error;
        self.issue_id = None;
        self.last_error = Some(error.into());
    }
}

impl Default for AgentLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
