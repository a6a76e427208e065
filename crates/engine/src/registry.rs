// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process agent lifecycle registry.
//!
//! The FSM values live here; the persistent [`falcon_core::AgentRecord`]
//! mirrors the phase for status queries. Transitions run under the
//! registry lock so two dispatches cannot race one agent.

use falcon_core::{AgentId, AgentLifecycle, CoreError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Shared registry of live agent lifecycles.
#[derive(Clone, Default)]
pub struct AgentRegistry {
    inner: Arc<Mutex<HashMap<AgentId, AgentLifecycle>>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent and release it into the pool.
    pub fn register(&self, id: AgentId) -> Result<(), CoreError> {
        let mut map = self.inner.lock();
        let lifecycle = map.entry(id).or_insert_with(AgentLifecycle::new);
        // A re-registered agent keeps its current phase.
        if lifecycle.phase() == falcon_core::AgentPhase::Init {
            lifecycle.release()?;
        }
        Ok(())
    }

    /// Snapshot of one agent's lifecycle.
    pub fn lifecycle(&self, id: &AgentId) -> Option<AgentLifecycle> {
        self.inner.lock().get(id).cloned()
    }

    /// Run `f` against the agent's lifecycle under the registry lock.
    pub fn transition<T>(
        &self,
        id: &AgentId,
        f: impl FnOnce(&mut AgentLifecycle) -> Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        let mut map = self.inner.lock();
        let lifecycle = map.get_mut(id).ok_or_else(|| CoreError::NotFound {
            entity: "agent",
            id: id.to_string(),
        })?;
        f(lifecycle)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
