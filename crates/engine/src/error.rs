// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine errors.

use falcon_core::CoreError;
use falcon_gitops::GitError;
use falcon_invoker::InvokerError;
use falcon_storage::StorageError;
use thiserror::Error;

/// Errors from dispatch and execution.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Invoker(#[from] InvokerError),

    /// No idle agent matches (project, model).
    #[error("no idle agent for model {model}")]
    NoAgentAvailable { model: String },
}
