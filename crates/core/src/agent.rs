// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent registry record.
//!
//! An agent is a named worker slot within a project: a logical name, a
//! model identifier, and an exclusive worktree derived from
//! (falcon-home, project-slug, agent-name). The live lifecycle phase is
//! tracked by [`crate::AgentLifecycle`]; the record mirrors it for
//! status queries.

use crate::issue::IssueId;
use crate::lifecycle::AgentPhase;
use crate::project::ProjectId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

crate::define_id! {
    /// Unique identifier for an agent slot.
    pub struct AgentId("agt-");
}

/// Registry record for one agent slot.
///
/// `name` is unique per project. The worktree path is deterministic and
/// never stored relative: it is derived through [`crate::WorktreeLayout`]
/// at registration time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: AgentId,
    pub project_id: ProjectId,
    /// Logical name, unique per project.
    pub name: String,
    /// Exclusive worktree for this agent.
    pub worktree_path: PathBuf,
    /// Model identifier used for dispatch matching.
    pub model: String,
    /// Mirror of the lifecycle phase.
    pub status: AgentPhase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_issue_id: Option<IssueId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl AgentRecord {
    pub fn new(
        project_id: ProjectId,
        name: impl Into<String>,
        worktree_path: PathBuf,
        model: impl Into<String>,
        now_ms: u64,
    ) -> Self {
        Self {
            id: AgentId::new(),
            project_id,
            name: name.into(),
            worktree_path,
            model: model.into(),
            status: AgentPhase::Init,
            current_issue_id: None,
            last_error: None,
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
        }
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
