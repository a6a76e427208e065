// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timeout-bounded git subprocess runner.
//!
//! Stdout is returned trimmed; stderr only ever surfaces inside a
//! [`GitError::CommandFailed`], scrubbed. `GIT_DIR`/`GIT_WORK_TREE`
//! are stripped from the environment so a caller's ambient git context
//! cannot leak into worktree operations.

use crate::error::GitError;
use falcon_core::scrub;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Default wall clock for ordinary git commands.
const GIT_TIMEOUT: Duration = Duration::from_secs(60);

/// Clones and fetches get longer.
const GIT_CLONE_TIMEOUT: Duration = Duration::from_secs(300);

/// Runs git commands with a timeout and scrubbed failures.
#[derive(Debug, Clone)]
pub struct GitRunner {
    timeout: Duration,
    clone_timeout: Duration,
}

impl Default for GitRunner {
    fn default() -> Self {
        Self { timeout: GIT_TIMEOUT, clone_timeout: GIT_CLONE_TIMEOUT }
    }
}

impl GitRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override both timeouts (tests).
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout, clone_timeout: timeout }
    }

    /// Run `git <args>` in `cwd`, returning trimmed stdout.
    pub async fn run(
        &self,
        cwd: Option<&Path>,
        args: &[&str],
        op: &'static str,
    ) -> Result<String, GitError> {
        self.run_bounded(cwd, args, op, self.timeout).await
    }

    /// Run a long operation (clone, fetch) with the extended timeout.
    pub async fn run_long(
        &self,
        cwd: Option<&Path>,
        args: &[&str],
        op: &'static str,
    ) -> Result<String, GitError> {
        self.run_bounded(cwd, args, op, self.clone_timeout).await
    }

    async fn run_bounded(
        &self,
        cwd: Option<&Path>,
        args: &[&str],
        op: &'static str,
        timeout: Duration,
    ) -> Result<String, GitError> {
        let mut cmd = Command::new("git");
        cmd.args(args)
            .env_remove("GIT_DIR")
            .env_remove("GIT_WORK_TREE")
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        let output = match tokio::time::timeout(timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(GitError::Io { op, detail: scrub(&e.to_string()) });
            }
            Err(_) => {
                tracing::warn!(op, seconds = timeout.as_secs(), "git command timed out");
                return Err(GitError::Timeout { op, seconds: timeout.as_secs() });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = scrub(stderr.trim());
            tracing::debug!(op, %detail, "git command failed");
            return Err(GitError::CommandFailed { op, detail });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
