// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Git synchronization: clone, branch checkout, rebase, commit, push.
//!
//! Preconditions follow the dispatcher's contract: branch checkout and
//! idle sync require a clean tree; clone refuses an existing target and
//! cleans up its own partial state on failure.

use crate::error::GitError;
use crate::runner::GitRunner;
use std::path::Path;

/// High-level git operations over a [`GitRunner`].
#[derive(Debug, Clone, Default)]
pub struct GitSync {
    runner: GitRunner,
}

impl GitSync {
    pub fn new(runner: GitRunner) -> Self {
        Self { runner }
    }

    /// True when `git status --porcelain` reports nothing.
    pub async fn is_clean(&self, worktree: &Path) -> Result<bool, GitError> {
        let out = self
            .runner
            .run(Some(worktree), &["status", "--porcelain"], "status")
            .await?;
        Ok(out.is_empty())
    }

    /// True when `branch` exists locally in `worktree`.
    pub async fn branch_exists(&self, worktree: &Path, branch: &str) -> Result<bool, GitError> {
        let refname = format!("refs/heads/{}", branch);
        match self
            .runner
            .run(Some(worktree), &["rev-parse", "--verify", "--quiet", &refname], "rev-parse")
            .await
        {
            Ok(_) => Ok(true),
            Err(GitError::CommandFailed { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// First provisioning clone of `origin` onto `base_branch`.
    ///
    /// Refuses if `target` exists. Clones shallow for speed, then
    /// unshallows so later rebases have full history. A failed clone
    /// removes whatever partial state it left behind.
    pub async fn clone_primary(
        &self,
        origin: &str,
        target: &Path,
        base_branch: &str,
    ) -> Result<(), GitError> {
        if target.exists() {
            return Err(GitError::TargetExists { path: target.display().to_string() });
        }

        let target_str = target.display().to_string();
        let result = self
            .runner
            .run_long(
                None,
                &["clone", "--depth", "1", "--branch", base_branch, origin, &target_str],
                "clone",
            )
            .await;
        if let Err(e) = result {
            if target.exists() {
                let _ = tokio::fs::remove_dir_all(target).await;
            }
            return Err(e);
        }

        let shallow = self
            .runner
            .run(Some(target), &["rev-parse", "--is-shallow-repository"], "rev-parse")
            .await?;
        if shallow == "true" {
            self.runner
                .run_long(Some(target), &["fetch", "--unshallow"], "fetch")
                .await?;
        }

        tracing::info!(origin_host = origin.split('/').nth(2).unwrap_or(""), target = %target_str, "cloned primary");
        Ok(())
    }

    /// Check out the issue branch in `worktree`, creating it from
    /// `base` if it does not exist locally. Requires a clean tree.
    pub async fn checkout_issue_branch(
        &self,
        worktree: &Path,
        branch: &str,
        base: &str,
    ) -> Result<(), GitError> {
        if !self.is_clean(worktree).await? {
            return Err(GitError::DirtyWorktree { path: worktree.display().to_string() });
        }

        if self.branch_exists(worktree, branch).await? {
            self.runner.run(Some(worktree), &["checkout", branch], "checkout").await?;
            return Ok(());
        }

        self.runner
            .run_long(Some(worktree), &["fetch", "origin", base], "fetch")
            .await?;
        self.runner.run(Some(worktree), &["checkout", base], "checkout").await?;
        self.runner.run_long(Some(worktree), &["pull", "origin", base], "pull").await?;
        self.runner
            .run(Some(worktree), &["checkout", "-b", branch, base], "checkout")
            .await?;
        Ok(())
    }

    /// Return an idle worktree to the tip of `base`. Requires a clean
    /// tree.
    pub async fn sync_to_base(&self, worktree: &Path, base: &str) -> Result<(), GitError> {
        if !self.is_clean(worktree).await? {
            return Err(GitError::DirtyWorktree { path: worktree.display().to_string() });
        }
        self.runner
            .run_long(Some(worktree), &["fetch", "origin", base], "fetch")
            .await?;
        self.runner.run(Some(worktree), &["checkout", base], "checkout").await?;
        self.runner.run_long(Some(worktree), &["pull", "origin", base], "pull").await?;
        Ok(())
    }

    /// `checkout <branch>; pull --rebase origin <branch>`.
    pub async fn pull_rebase(&self, worktree: &Path, branch: &str) -> Result<(), GitError> {
        self.runner.run(Some(worktree), &["checkout", branch], "checkout").await?;
        self.runner
            .run_long(Some(worktree), &["pull", "--rebase", "origin", branch], "pull")
            .await?;
        Ok(())
    }

    /// Stage `files` (all when empty), commit with `message`, push to
    /// origin (`branch` explicitly when given).
    pub async fn commit_and_push(
        &self,
        worktree: &Path,
        message: &str,
        files: &[String],
        branch: Option<&str>,
    ) -> Result<(), GitError> {
        if files.is_empty() {
            self.runner.run(Some(worktree), &["add", "-A"], "add").await?;
        } else {
            let mut args = vec!["add", "--"];
            args.extend(files.iter().map(String::as_str));
            self.runner.run(Some(worktree), &args, "add").await?;
        }

        self.runner
            .run(Some(worktree), &["commit", "-m", message], "commit")
            .await?;

        match branch {
            Some(branch) => {
                self.runner
                    .run_long(Some(worktree), &["push", "origin", branch], "push")
                    .await?;
            }
            None => {
                self.runner.run_long(Some(worktree), &["push", "origin"], "push").await?;
            }
        }
        Ok(())
    }

    /// Configure committer identity for a worktree.
    pub async fn configure_identity(
        &self,
        worktree: &Path,
        name: &str,
        email: &str,
    ) -> Result<(), GitError> {
        self.runner
            .run(Some(worktree), &["config", "user.name", name], "config")
            .await?;
        self.runner
            .run(Some(worktree), &["config", "user.email", email], "config")
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
