// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage error type.

use thiserror::Error;

/// Errors raised by repositories.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("conflict: {0}")]
    Conflict(String),

    /// Optimistic concurrency failure: the record changed between read
    /// and write. Callers re-read and retry.
    #[error("stale write for {entity} {id}: expected version {expected}, found {found}")]
    StaleVersion { entity: &'static str, id: String, expected: u64, found: u64 },
}

impl StorageError {
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound { entity, id: id.to_string() }
    }
}
