// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builders and fixtures for other crates' tests.

use crate::agent::AgentRecord;
use crate::issue::Issue;
use crate::project::{Project, ProjectId};
use std::path::PathBuf;

/// A project with deterministic-ish defaults for tests.
pub fn project_fixture() -> Project {
    Project::new("https://github.com/acme/widgets.git", "Widgets", "widgets", 1_000_000)
}

/// An issue under `project` with the given number and title.
pub fn issue_fixture(project_id: ProjectId, number: u64, title: &str) -> Issue {
    Issue::new(project_id, number, title, format!("Description for {}", title), 1_000_000)
}

/// An agent slot under `project` named `name`.
pub fn agent_fixture(project_id: ProjectId, name: &str) -> AgentRecord {
    AgentRecord::new(
        project_id,
        name,
        PathBuf::from(format!("/tmp/falcon-test/projects/widgets/agents/{}", name)),
        "claude-sonnet",
        1_000_000,
    )
}
