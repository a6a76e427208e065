// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worktree adapter seam.
//!
//! The dispatcher only needs "give me a checked-out worktree for this
//! issue branch"; the git mechanics live behind this trait so tests can
//! swap in a fake.

use async_trait::async_trait;
use falcon_core::{AgentRecord, Project};
use falcon_gitops::{GitError, GitSync, Provisioner};
use std::path::PathBuf;

/// Prepares an agent's worktree for one issue branch.
#[async_trait]
pub trait WorktreeAdapter: Send + Sync {
    /// Ensure the agent worktree exists and has `branch` checked out
    /// (created from the project base when absent). Returns the
    /// worktree path.
    async fn prepare(
        &self,
        project: &Project,
        agent: &AgentRecord,
        branch: &str,
    ) -> Result<PathBuf, GitError>;
}

/// Production adapter over the provisioner and git sync.
pub struct GitWorktreeAdapter {
    provisioner: Provisioner,
    sync: GitSync,
}

impl GitWorktreeAdapter {
    pub fn new(provisioner: Provisioner, sync: GitSync) -> Self {
        Self { provisioner, sync }
    }
}

#[async_trait]
impl WorktreeAdapter for GitWorktreeAdapter {
    async fn prepare(
        &self,
        project: &Project,
        agent: &AgentRecord,
        branch: &str,
    ) -> Result<PathBuf, GitError> {
        let worktree = self.provisioner.ensure_agent_worktree(project, &agent.name).await?;
        self.sync
            .checkout_issue_branch(&worktree, branch, &project.base_branch)
            .await?;
        Ok(worktree)
    }
}

/// Fake adapter: records calls and returns a fixed path.
#[cfg(any(test, feature = "test-support"))]
pub struct FakeWorktreeAdapter {
    pub path: PathBuf,
    pub fail_with: parking_lot::Mutex<Option<String>>,
    pub prepared: parking_lot::Mutex<Vec<String>>,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeWorktreeAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            fail_with: parking_lot::Mutex::new(None),
            prepared: parking_lot::Mutex::new(Vec::new()),
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl WorktreeAdapter for FakeWorktreeAdapter {
    async fn prepare(
        &self,
        _project: &Project,
        _agent: &AgentRecord,
        branch: &str,
    ) -> Result<PathBuf, GitError> {
        if let Some(detail) = self.fail_with.lock().clone() {
            return Err(GitError::CommandFailed { op: "checkout", detail });
        }
        self.prepared.lock().push(branch.to_string());
        Ok(self.path.clone())
    }
}
