// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Broadcast bus: domain event fan-out per channel.

use falcon_core::{Channel, DomainEvent};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Pub/sub for domain events keyed by channel.
///
/// Events on one channel reach each subscriber in publication order.
/// Publishing to a channel with no subscribers is a no-op.
#[derive(Clone, Default)]
pub struct BroadcastBus {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    next_token: AtomicU64,
    subs: Mutex<HashMap<Channel, HashMap<u64, mpsc::UnboundedSender<DomainEvent>>>>,
}

/// Guard for one channel subscription. Dropping it unsubscribes.
pub struct EventSubscription {
    bus: BroadcastBus,
    channel: Channel,
    token: u64,
    rx: mpsc::UnboundedReceiver<DomainEvent>,
}

impl BroadcastBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, channel: Channel) -> EventSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let token = self.inner.next_token.fetch_add(1, Ordering::Relaxed);
        self.inner.subs.lock().entry(channel.clone()).or_default().insert(token, tx);
        EventSubscription { bus: self.clone(), channel, token, rx }
    }

    /// Publish an event to one channel.
    pub fn publish(&self, channel: &Channel, event: DomainEvent) {
        let mut subs = self.inner.subs.lock();
        let Some(channel_subs) = subs.get_mut(channel) else {
            return;
        };
        channel_subs.retain(|_, tx| tx.send(event.clone()).is_ok());
        if channel_subs.is_empty() {
            subs.remove(channel);
        }
    }

    /// Publish to both the project channel and, when set, the issue
    /// channel of the event.
    pub fn publish_scoped(&self, event: DomainEvent) {
        self.publish(&Channel::Project(event.project_id), event.clone());
        if let Some(issue_id) = event.issue_id {
            self.publish(&Channel::Issue(issue_id), event);
        }
    }

    pub fn subscriber_count(&self, channel: &Channel) -> usize {
        self.inner.subs.lock().get(channel).map_or(0, |m| m.len())
    }

    fn unsubscribe(&self, channel: &Channel, token: u64) {
        let mut subs = self.inner.subs.lock();
        if let Some(channel_subs) = subs.get_mut(channel) {
            channel_subs.remove(&token);
            if channel_subs.is_empty() {
                subs.remove(channel);
            }
        }
    }
}

impl EventSubscription {
    pub async fn recv(&mut self) -> Option<DomainEvent> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<DomainEvent> {
        self.rx.try_recv().ok()
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(&self.channel, self.token);
    }
}

#[cfg(test)]
#[path = "broadcast_tests.rs"]
mod tests;
