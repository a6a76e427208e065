// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Git operation errors. All messages are pre-scrubbed.

use falcon_core::CoreError;
use thiserror::Error;

/// Errors from git synchronization and provisioning.
#[derive(Debug, Error)]
pub enum GitError {
    /// The worktree has uncommitted changes and the operation requires
    /// a clean tree. Recoverable: commit, stash, or release the agent.
    #[error("dirty worktree at {path}")]
    DirtyWorktree { path: String },

    /// Wall-clock limit exceeded for one git command.
    #[error("git {op} timed out after {seconds}s")]
    Timeout { op: &'static str, seconds: u64 },

    /// git exited non-zero. `detail` is scrubbed stderr.
    #[error("git {op} failed: {detail}")]
    CommandFailed { op: &'static str, detail: String },

    /// Clone refused because the target already exists.
    #[error("clone target already exists: {path}")]
    TargetExists { path: String },

    #[error("io error during {op}: {detail}")]
    Io { op: &'static str, detail: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}
