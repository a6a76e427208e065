// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Custom error type that carries a process exit code.
//!
//! Commands return `ExitError` instead of calling `std::process::exit()`
//! directly, allowing `main()` to handle process termination.

use std::fmt;

/// Usage or precondition failure.
pub const EXIT_USAGE: i32 = 1;

/// Transient failure; retrying may succeed.
pub const EXIT_TRANSIENT: i32 = 2;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: message.into() }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self { code: EXIT_TRANSIENT, message: message.into() }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

impl From<std::io::Error> for ExitError {
    fn from(e: std::io::Error) -> Self {
        Self::transient(e.to_string())
    }
}
