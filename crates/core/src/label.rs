// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Labels and the built-in label set.

use crate::project::ProjectId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a label.
    pub struct LabelId("lbl-");
}

impl PartialOrd for LabelId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LabelId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_str().cmp(other.as_str())
    }
}

/// A label attachable to issues. Built-in labels have no owning project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    pub id: LabelId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    pub name: String,
    pub color: String,
}

impl Label {
    pub fn builtin(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self { id: LabelId::new(), project_id: None, name: name.into(), color: color.into() }
    }
}

/// The built-in labels seeded into every workspace. Seeding is
/// idempotent: applying the seed twice leaves the count at this
/// definition's length.
pub fn builtin_labels() -> Vec<Label> {
    [
        ("bug", "#d73a4a"),
        ("feature", "#a2eeef"),
        ("refactor", "#cfd3d7"),
        ("docs", "#0075ca"),
        ("security", "#ee0701"),
        ("performance", "#fbca04"),
    ]
    .into_iter()
    .map(|(name, color)| Label::builtin(name, color))
    .collect()
}

#[cfg(test)]
#[path = "label_tests.rs"]
mod tests;
