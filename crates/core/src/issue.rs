// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Issue entity and the composite `start` operation.
//!
//! Issues carry both a status (kanban column) and a stage (pipeline
//! position). The two mutate together in exactly one place: `start`,
//! which moves status to `in_progress` and stage to `context_pack` and
//! derives the branch name on first start.

use crate::agent::AgentId;
use crate::error::CoreError;
use crate::label::LabelId;
use crate::project::ProjectId;
use crate::stage::{can_transition, Stage};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueId(pub Uuid);

impl IssueId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for IssueId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kanban status of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    Backlog,
    Todo,
    InProgress,
    Done,
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IssueStatus::Backlog => "backlog",
            IssueStatus::Todo => "todo",
            IssueStatus::InProgress => "in_progress",
            IssueStatus::Done => "done",
        };
        write!(f, "{}", s)
    }
}

/// Issue priority, lowest to highest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

/// A software-engineering issue advancing through the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: IssueId,
    pub project_id: ProjectId,
    /// Project-scoped monotonic number.
    pub number: u64,
    pub title: String,
    pub description: String,
    pub status: IssueStatus,
    pub stage: Stage,
    pub priority: Priority,
    #[serde(default)]
    pub labels: BTreeSet<LabelId>,
    /// Derived from `issue/<n>-<slugified-title>` on first start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,
    /// Set by the external PR webhook.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_agent_id: Option<AgentId>,
    /// Optimistic concurrency version, bumped on every write.
    #[serde(default)]
    pub version: u64,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at_ms: Option<u64>,
}

impl Issue {
    pub fn new(
        project_id: ProjectId,
        number: u64,
        title: impl Into<String>,
        description: impl Into<String>,
        now_ms: u64,
    ) -> Self {
        Self {
            id: IssueId::new(),
            project_id,
            number,
            title: title.into(),
            description: description.into(),
            status: IssueStatus::Backlog,
            stage: Stage::Backlog,
            priority: Priority::default(),
            labels: BTreeSet::new(),
            branch_name: None,
            pr_number: None,
            pr_url: None,
            assigned_agent_id: None,
            version: 0,
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
            started_at_ms: None,
            completed_at_ms: None,
        }
    }

    /// Start work: the only operation that mutates status and stage
    /// together. Permitted when status is backlog/todo and stage is
    /// Backlog/Todo; moves to in_progress + ContextPack and derives the
    /// branch name on first start.
    pub fn start(&mut self, now_ms: u64) -> Result<(), CoreError> {
        let status_ok = matches!(self.status, IssueStatus::Backlog | IssueStatus::Todo);
        let stage_ok = matches!(self.stage, Stage::Backlog | Stage::Todo);
        if !status_ok || !stage_ok {
            return Err(CoreError::invalid_transition(
                format!("{}/{}", self.status, self.stage),
                "in_progress/context_pack",
            ));
        }
        self.status = IssueStatus::InProgress;
        self.stage = Stage::ContextPack;
        if self.branch_name.is_none() {
            self.branch_name = Some(self.derived_branch_name());
        }
        self.started_at_ms = Some(now_ms);
        self.updated_at_ms = now_ms;
        Ok(())
    }

    /// Advance to the next stage along the graph. Reaching `Done` also
    /// closes the issue.
    pub fn advance(&mut self, to: Stage, now_ms: u64) -> Result<(), CoreError> {
        if !can_transition(self.stage, to) {
            return Err(CoreError::invalid_transition(self.stage.to_string(), to.to_string()));
        }
        self.stage = to;
        match to {
            Stage::Todo => self.status = IssueStatus::Todo,
            Stage::Done => {
                self.status = IssueStatus::Done;
                self.completed_at_ms = Some(now_ms);
            }
            _ => {}
        }
        self.updated_at_ms = now_ms;
        Ok(())
    }

    /// `issue/<n>-<slugified-title>`
    pub fn derived_branch_name(&self) -> String {
        format!("issue/{}-{}", self.number, slugify(&self.title))
    }
}

/// Lowercase, keep alphanumerics, collapse everything else into single
/// hyphens, trim hyphens, cap at 48 chars.
pub fn slugify(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_dash = true;
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
        if out.len() >= 48 {
            break;
        }
    }
    out.trim_matches('-').to_string()
}

#[cfg(test)]
#[path = "issue_tests.rs"]
mod tests;
