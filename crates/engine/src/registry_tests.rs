// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use falcon_core::{AgentPhase, IssueId};

#[test]
fn register_releases_into_pool() {
    let registry = AgentRegistry::new();
    let id = AgentId::from_string("agt-1");
    registry.register(id).unwrap();
    assert_eq!(registry.lifecycle(&id).unwrap().phase(), AgentPhase::Idle);
}

#[test]
fn reregistering_keeps_current_phase() {
    let registry = AgentRegistry::new();
    let id = AgentId::from_string("agt-1");
    registry.register(id).unwrap();
    registry.transition(&id, |lc| lc.begin_checkout(IssueId::new())).unwrap();

    registry.register(id).unwrap();
    assert_eq!(registry.lifecycle(&id).unwrap().phase(), AgentPhase::Checkout);
}

#[test]
fn transition_on_unknown_agent_is_not_found() {
    let registry = AgentRegistry::new();
    let err = registry
        .transition(&AgentId::from_string("agt-ghost"), |lc| lc.release())
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));
}

#[test]
fn transitions_apply_under_lock() {
    let registry = AgentRegistry::new();
    let id = AgentId::from_string("agt-1");
    registry.register(id).unwrap();

    let issue = IssueId::new();
    registry.transition(&id, |lc| lc.begin_checkout(issue)).unwrap();
    registry.transition(&id, |lc| lc.begin_work()).unwrap();
    let lc = registry.lifecycle(&id).unwrap();
    assert_eq!(lc.phase(), AgentPhase::Working);
    assert_eq!(lc.issue_id(), Some(issue));
}
