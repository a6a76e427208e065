// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! falcon-invoker: subprocess invocation for stage agents.
//!
//! One invocation is one run. Both invoker variants enforce the same
//! envelope — a 50 KiB prompt cap, a five-minute wall clock with
//! graceful-then-forceful termination, and a five-wide FIFO concurrency
//! gate. The streaming variant additionally parses newline-delimited
//! JSON frames from stdout, extracts human-readable text, scrubs it,
//! and publishes complete lines to the output bus.
//!
//! stderr is deliberately not captured: an unread stderr pipe can
//! deadlock a chatty subprocess against a blocked writer.

mod error;
mod invoker;
mod stream;

pub use error::InvokerError;
pub use invoker::{
    AgentInvoker, InvokeOutcome, InvokeRequest, InvokerConfig, RunHandle, SilentInvoker,
    StreamingInvoker, KILL_GRACE, MAX_CONCURRENT_RUNS, PROMPT_MAX_BYTES, RUN_TIMEOUT,
};
pub use stream::{FrameExtractor, LineBuffer};
