// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Domain events, output lines, and subscription channels.
//!
//! Two streams exist: line-level subprocess output keyed by run, and
//! domain events fanned out per channel. Both are serialized to clients
//! over the framed transport.

use crate::agent::AgentId;
use crate::issue::IssueId;
use crate::project::ProjectId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

crate::define_id! {
    /// One stage-invocation of one agent; the unit of output streaming.
    pub struct RunId("run-");
}

/// A single line of subprocess output attributed to a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputLine {
    pub run_id: RunId,
    pub agent_id: AgentId,
    pub issue_id: IssueId,
    pub line: String,
    /// Epoch milliseconds at emission.
    pub at: u64,
}

/// Kinds of domain events broadcast to channel subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "project.created")]
    ProjectCreated,
    #[serde(rename = "project.updated")]
    ProjectUpdated,
    #[serde(rename = "project.deleted")]
    ProjectDeleted,
    #[serde(rename = "issue.created")]
    IssueCreated,
    #[serde(rename = "issue.updated")]
    IssueUpdated,
    #[serde(rename = "issue.deleted")]
    IssueDeleted,
    #[serde(rename = "comment.created")]
    CommentCreated,
    #[serde(rename = "label.created")]
    LabelCreated,
    #[serde(rename = "document.created")]
    DocumentCreated,
    /// Lifted from the output bus when a subscriber asks for `run:<id>`.
    #[serde(rename = "agent.output")]
    AgentOutput,
}

/// A domain event as published on the broadcast bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Epoch milliseconds at publication.
    pub at: u64,
    pub project_id: ProjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_id: Option<IssueId>,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// A subscription channel on the broadcast bus.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Channel {
    Project(ProjectId),
    Issue(IssueId),
    Run(RunId),
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Project(id) => write!(f, "project:{}", id),
            Channel::Issue(id) => write!(f, "issue:{}", id),
            Channel::Run(id) => write!(f, "run:{}", id),
        }
    }
}

/// Error for unparseable channel strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadChannel(pub String);

impl fmt::Display for BadChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown channel: {}", self.0)
    }
}

impl std::error::Error for BadChannel {}

impl FromStr for Channel {
    type Err = BadChannel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s.split_once(':').ok_or_else(|| BadChannel(s.to_string()))?;
        if id.is_empty() {
            return Err(BadChannel(s.to_string()));
        }
        match kind {
            "project" => uuid::Uuid::parse_str(id)
                .map(|u| Channel::Project(ProjectId(u)))
                .map_err(|_| BadChannel(s.to_string())),
            "issue" => uuid::Uuid::parse_str(id)
                .map(|u| Channel::Issue(IssueId(u)))
                .map_err(|_| BadChannel(s.to_string())),
            "run" => Ok(Channel::Run(RunId::from_string(id))),
            _ => Err(BadChannel(s.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
