// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output bus: subprocess line fan-out keyed by run.

use falcon_core::{OutputLine, RunId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Pub/sub for run output lines.
///
/// Publishing never blocks: slow subscribers buffer in their unbounded
/// channel, dead subscribers are pruned on the next publish to their
/// run.
#[derive(Clone, Default)]
pub struct OutputBus {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    next_token: AtomicU64,
    subs: Mutex<HashMap<RunId, HashMap<u64, mpsc::UnboundedSender<OutputLine>>>>,
}

/// Guard for one subscription. Dropping it unsubscribes in O(1).
pub struct OutputSubscription {
    bus: OutputBus,
    run_id: RunId,
    token: u64,
    rx: mpsc::UnboundedReceiver<OutputLine>,
}

impl OutputBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to the lines of one run. Lines published after this
    /// call are delivered in publication order.
    pub fn subscribe(&self, run_id: RunId) -> OutputSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let token = self.inner.next_token.fetch_add(1, Ordering::Relaxed);
        self.inner.subs.lock().entry(run_id).or_default().insert(token, tx);
        OutputSubscription { bus: self.clone(), run_id, token, rx }
    }

    /// Publish one line to every subscriber of its run.
    pub fn publish(&self, line: OutputLine) {
        let mut subs = self.inner.subs.lock();
        let Some(run_subs) = subs.get_mut(&line.run_id) else {
            return;
        };
        run_subs.retain(|_, tx| tx.send(line.clone()).is_ok());
        if run_subs.is_empty() {
            subs.remove(&line.run_id);
        }
    }

    /// Number of live subscribers for a run (diagnostics).
    pub fn subscriber_count(&self, run_id: &RunId) -> usize {
        self.inner.subs.lock().get(run_id).map_or(0, |m| m.len())
    }

    fn unsubscribe(&self, run_id: &RunId, token: u64) {
        let mut subs = self.inner.subs.lock();
        if let Some(run_subs) = subs.get_mut(run_id) {
            run_subs.remove(&token);
            if run_subs.is_empty() {
                subs.remove(run_id);
            }
        }
    }
}

impl OutputSubscription {
    /// Receive the next line; `None` once the bus side is gone and the
    /// buffer is drained.
    pub async fn recv(&mut self) -> Option<OutputLine> {
        self.rx.recv().await
    }

    /// Non-blocking receive for tests and polling paths.
    pub fn try_recv(&mut self) -> Option<OutputLine> {
        self.rx.try_recv().ok()
    }
}

impl Drop for OutputSubscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(&self.run_id, self.token);
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
