// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project entity.
//!
//! A project is identified by its canonical repository origin URL plus an
//! optional subdirectory. Identity is immutable; name and configuration
//! are mutable. Projects own issues, labels, and agents.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub Uuid);

impl ProjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ProjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectLifecycle {
    #[default]
    Active,
    Archived,
}

/// A project owning issues, labels, and agents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    /// Canonical repository origin URL. Immutable.
    pub origin_url: String,
    /// Optional subdirectory within the repository. Immutable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdir: Option<String>,
    /// Display name. Mutable.
    pub name: String,
    /// Filesystem slug, unique across the workspace.
    pub slug: String,
    /// Branch that issue branches fork from.
    pub base_branch: String,
    pub lifecycle: ProjectLifecycle,
    /// Next project-scoped issue number to hand out.
    pub next_issue_number: u64,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl Project {
    pub fn new(
        origin_url: impl Into<String>,
        name: impl Into<String>,
        slug: impl Into<String>,
        now_ms: u64,
    ) -> Self {
        Self {
            id: ProjectId::new(),
            origin_url: canonical_origin(&origin_url.into()),
            subdir: None,
            name: name.into(),
            slug: slug.into(),
            base_branch: "main".to_string(),
            lifecycle: ProjectLifecycle::Active,
            next_issue_number: 1,
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
        }
    }

    /// Hand out the next issue number, advancing the counter.
    pub fn take_issue_number(&mut self) -> u64 {
        let n = self.next_issue_number;
        self.next_issue_number += 1;
        n
    }
}

/// Normalize a repository origin URL for identity comparison.
///
/// Trims whitespace, strips a trailing `/`, strips a trailing `.git`,
/// and lowercases the scheme and host. The path is left case-sensitive.
pub fn canonical_origin(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    let url = url.strip_suffix(".git").unwrap_or(url);
    match url.split_once("://") {
        Some((scheme, rest)) => {
            let (host, path) = match rest.split_once('/') {
                Some((h, p)) => (h, Some(p)),
                None => (rest, None),
            };
            let mut out = format!("{}://{}", scheme.to_ascii_lowercase(), host.to_ascii_lowercase());
            if let Some(p) = path {
                out.push('/');
                out.push_str(p);
            }
            out
        }
        None => url.to_string(),
    }
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;
