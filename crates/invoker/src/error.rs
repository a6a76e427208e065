// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Invoker errors.

use falcon_core::RunId;
use thiserror::Error;

/// Errors from subprocess invocation.
#[derive(Debug, Error)]
pub enum InvokerError {
    /// Prompt exceeds the UTF-8 byte cap. The caller must shrink it;
    /// nothing was spawned.
    #[error("prompt too large: {bytes} bytes (max {max})")]
    PromptTooLarge { bytes: usize, max: usize },

    /// Hard wall clock exceeded. The subprocess was terminated.
    #[error("run {run_id} timed out after {seconds}s")]
    Timeout { run_id: RunId, seconds: u64 },

    /// Subprocess could not be spawned or waited on. Detail scrubbed.
    #[error("subprocess failure: {detail}")]
    Internal { detail: String },
}
