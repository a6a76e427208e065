// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline stage graph.
//!
//! Issues advance through a fixed directed graph of stages. The graph is
//! encoded in [`Stage::successors`]; [`can_transition`] is a pure, total
//! predicate over it. Starting work is not a plain transition — it is the
//! composite operation on [`crate::Issue`] that moves status and stage
//! together.

use crate::issue::IssueStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A stage in the issue pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Backlog,
    Todo,
    ContextPack,
    ContextReview,
    Spec,
    SpecReview,
    Implement,
    PrReview,
    PrHumanReview,
    Fixer,
    Testing,
    DocReview,
    MergeReady,
    Done,
}

impl Stage {
    /// All stages, in pipeline order.
    pub const ALL: [Stage; 14] = [
        Stage::Backlog,
        Stage::Todo,
        Stage::ContextPack,
        Stage::ContextReview,
        Stage::Spec,
        Stage::SpecReview,
        Stage::Implement,
        Stage::PrReview,
        Stage::PrHumanReview,
        Stage::Fixer,
        Stage::Testing,
        Stage::DocReview,
        Stage::MergeReady,
        Stage::Done,
    ];

    /// The stages reachable from this stage in one transition.
    pub fn successors(self) -> &'static [Stage] {
        match self {
            Stage::Backlog => &[Stage::Todo],
            Stage::Todo => &[Stage::ContextPack],
            Stage::ContextPack => &[Stage::ContextReview],
            Stage::ContextReview => &[Stage::Spec, Stage::Implement],
            Stage::Spec => &[Stage::SpecReview],
            Stage::SpecReview => &[Stage::Implement, Stage::Spec],
            Stage::Implement => &[Stage::PrReview],
            Stage::PrReview => &[Stage::PrHumanReview],
            Stage::PrHumanReview => &[Stage::Fixer, Stage::Testing],
            Stage::Fixer => &[Stage::PrReview],
            Stage::Testing => &[Stage::DocReview, Stage::Implement],
            Stage::DocReview => &[Stage::MergeReady],
            Stage::MergeReady => &[Stage::Done],
            Stage::Done => &[],
        }
    }

    /// True when no further transitions exist.
    pub fn is_terminal(self) -> bool {
        self.successors().is_empty()
    }

    /// The carrier document produced at this stage, if any.
    pub fn carrier(self) -> Option<CarrierStage> {
        match self {
            Stage::ContextPack => Some(CarrierStage::ContextPack),
            Stage::Spec => Some(CarrierStage::Spec),
            _ => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Backlog => "backlog",
            Stage::Todo => "todo",
            Stage::ContextPack => "context_pack",
            Stage::ContextReview => "context_review",
            Stage::Spec => "spec",
            Stage::SpecReview => "spec_review",
            Stage::Implement => "implement",
            Stage::PrReview => "pr_review",
            Stage::PrHumanReview => "pr_human_review",
            Stage::Fixer => "fixer",
            Stage::Testing => "testing",
            Stage::DocReview => "doc_review",
            Stage::MergeReady => "merge_ready",
            Stage::Done => "done",
        };
        write!(f, "{}", s)
    }
}

/// The two stages whose output documents guide downstream agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CarrierStage {
    ContextPack,
    Spec,
}

impl fmt::Display for CarrierStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CarrierStage::ContextPack => write!(f, "context-pack"),
            CarrierStage::Spec => write!(f, "spec"),
        }
    }
}

/// Whether a transition between two stages is allowed by the graph.
///
/// Pure and total: any pair of stages yields an answer, no state is
/// consulted.
pub fn can_transition(from: Stage, to: Stage) -> bool {
    from.successors().contains(&to)
}

/// The issue statuses permitted while an issue sits at `stage`.
pub fn allowed_statuses(stage: Stage) -> &'static [IssueStatus] {
    match stage {
        Stage::Backlog => &[IssueStatus::Backlog],
        Stage::Todo => &[IssueStatus::Todo],
        Stage::Done => &[IssueStatus::Done],
        _ => &[IssueStatus::InProgress],
    }
}

#[cfg(test)]
#[path = "stage_tests.rs"]
mod tests;
