// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem layout under the falcon home directory.
//!
//! Maps (home, project, agent) to worktree paths. Every caller-supplied
//! path component is validated before it touches a path join: non-empty,
//! no `..` segment, never absolute. The home itself must be absolute.
//!
//! ```text
//! <home>/projects/<projectSlug>/primary
//! <home>/projects/<projectSlug>/agents/<agentName>
//! <home>/projects/<projectSlug>/issues/<issueId>
//! <home>/pm.db
//! ```

use crate::error::CoreError;
use std::path::{Component, Path, PathBuf};

/// Directory mode for everything falcon creates under its home.
pub const DIR_MODE: u32 = 0o700;

/// Database file mode.
pub const DB_MODE: u32 = 0o600;

/// Resolver from (project, agent, issue) to on-disk paths.
#[derive(Debug, Clone)]
pub struct WorktreeLayout {
    home: PathBuf,
}

impl WorktreeLayout {
    /// Create a layout rooted at `home`. The home must be absolute.
    pub fn new(home: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let home = home.into();
        if !home.is_absolute() {
            return Err(CoreError::validation("home", "must be an absolute path"));
        }
        Ok(Self { home })
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// `<home>/pm.db`
    pub fn db_path(&self) -> PathBuf {
        self.home.join("pm.db")
    }

    /// `<home>/projects/<slug>`
    pub fn project_dir(&self, project_slug: &str) -> Result<PathBuf, CoreError> {
        let slug = validated("project_slug", project_slug)?;
        Ok(self.home.join("projects").join(slug))
    }

    /// `<home>/projects/<slug>/primary` — the canonical checkout.
    pub fn primary_dir(&self, project_slug: &str) -> Result<PathBuf, CoreError> {
        Ok(self.project_dir(project_slug)?.join("primary"))
    }

    /// `<home>/projects/<slug>/agents/<agentName>` — exclusive worktree.
    pub fn agent_dir(&self, project_slug: &str, agent_name: &str) -> Result<PathBuf, CoreError> {
        let agent = validated("agent_name", agent_name)?;
        Ok(self.project_dir(project_slug)?.join("agents").join(agent))
    }

    /// `<home>/projects/<slug>/issues/<issueId>` — issue-local artifacts.
    pub fn issue_dir(&self, project_slug: &str, issue_id: &str) -> Result<PathBuf, CoreError> {
        let issue = validated("issue_id", issue_id)?;
        Ok(self.project_dir(project_slug)?.join("issues").join(issue))
    }
}

/// Validate a single path component: non-empty, no `..`, not absolute,
/// no separators.
fn validated<'a>(field: &'static str, value: &'a str) -> Result<&'a str, CoreError> {
    if value.is_empty() {
        return Err(CoreError::validation(field, "must not be empty"));
    }
    let path = Path::new(value);
    if path.is_absolute() {
        return Err(CoreError::validation(field, "must not be absolute"));
    }
    let mut components = path.components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(value),
        _ => Err(CoreError::validation(
            field,
            format!("must be a single path component without `..`: {:?}", value),
        )),
    }
}

#[cfg(test)]
#[path = "layout_tests.rs"]
mod tests;
