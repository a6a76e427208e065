// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Attribution errors.

use thiserror::Error;

/// Errors raised by the attribution engine.
#[derive(Debug, Error)]
pub enum AttributionError {
    /// The external agent returned a malformed evidence bundle.
    #[error("invalid evidence bundle: {0}")]
    Invalid(String),

    /// The external call failed in a way worth retrying. The engine
    /// itself never retries; the caller decides.
    #[error("attribution call failed (retryable): {0}")]
    Retryable(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Alert already promoted, duplicate pattern, and similar.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Pattern creation denied by the kill switch. Not an error for
    /// callers to propagate — it is logged with the blocking reason.
    #[error("pattern creation denied: {0}")]
    Denied(String),
}
