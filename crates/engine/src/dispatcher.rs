// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatcher: binds issues to idle agents and drives their lifecycle.
//!
//! One issue binds at most one agent and one agent at most one issue;
//! both sides are serialized through per-entity locks. Side effects
//! (worktree checkout, subprocess) happen between FSM transitions and
//! are reflected into the FSM only on success. The run outcome is
//! reconciled by a spawned completion task so `dispatch` can return the
//! run id while the subprocess streams.

use crate::error::EngineError;
use crate::executor::WorkflowExecutor;
use crate::locks::EntityLocks;
use crate::registry::AgentRegistry;
use crate::worktree::WorktreeAdapter;
use falcon_core::{
    scrub, AgentPhase, AgentRecord, Clock, CoreError, IssueId, ProjectId, RunId, SystemClock,
};
use falcon_storage::{AgentRepo, IssueRepo, ProjectRepo};
use std::sync::Arc;

/// Dispatches issues onto agents.
pub struct Dispatcher<C: Clock = SystemClock> {
    projects: Arc<dyn ProjectRepo>,
    issues: Arc<dyn IssueRepo>,
    agents: Arc<dyn AgentRepo>,
    registry: AgentRegistry,
    worktrees: Arc<dyn WorktreeAdapter>,
    executor: Arc<WorkflowExecutor>,
    locks: EntityLocks,
    clock: C,
}

impl<C: Clock + 'static> Dispatcher<C> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        projects: Arc<dyn ProjectRepo>,
        issues: Arc<dyn IssueRepo>,
        agents: Arc<dyn AgentRepo>,
        registry: AgentRegistry,
        worktrees: Arc<dyn WorktreeAdapter>,
        executor: Arc<WorkflowExecutor>,
        locks: EntityLocks,
        clock: C,
    ) -> Self {
        Self { projects, issues, agents, registry, worktrees, executor, locks, clock }
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// First idle agent in the project whose model matches.
    pub fn select_agent(&self, project: &ProjectId, model: &str) -> Option<AgentRecord> {
        self.agents.list_for_project(project).into_iter().find(|agent| {
            agent.model == model
                && self
                    .registry
                    .lifecycle(&agent.id)
                    .map_or(false, |lc| lc.phase() == AgentPhase::Idle)
        })
    }

    /// Dispatch `issue_id` at its current stage onto an idle `model`
    /// agent. Returns the run id once the subprocess is started; the
    /// outcome is reconciled in the background.
    pub async fn dispatch(
        &self,
        issue_id: IssueId,
        model: &str,
        injection: &str,
    ) -> Result<RunId, EngineError> {
        // Two dispatches for the same issue serialize here.
        let _issue_guard = self.locks.acquire(&format!("issue:{}", issue_id)).await;

        let mut issue = self.issues.get(&issue_id)?;
        if let Some(bound) = issue.assigned_agent_id {
            return Err(EngineError::Core(CoreError::AgentBusy(format!(
                "issue #{} already bound to agent {}",
                issue.number, bound
            ))));
        }
        let project = self.projects.get(&issue.project_id)?;
        let stage = issue.stage;

        let agent = self
            .select_agent(&issue.project_id, model)
            .ok_or_else(|| EngineError::NoAgentAvailable { model: model.to_string() })?;
        let _agent_guard = self.locks.acquire(&format!("agent:{}", agent.id)).await;

        // 1. IDLE -> CHECKOUT binds the issue.
        self.registry.transition(&agent.id, |lc| lc.begin_checkout(issue_id))?;
        self.mirror(&agent.id);
        issue.assigned_agent_id = Some(agent.id);
        let issue = match self.issues.update(issue) {
            Ok(issue) => issue,
            Err(e) => {
                // Optimistic write lost; unwind the FSM binding.
                let _ = self.registry.transition(&agent.id, |lc| {
                    lc.fail("issue binding lost a concurrent update");
                    Ok(())
                });
                let _ = self.registry.transition(&agent.id, |lc| lc.release());
                self.mirror(&agent.id);
                return Err(e.into());
            }
        };

        let branch = issue
            .branch_name
            .clone()
            .unwrap_or_else(|| issue.derived_branch_name());

        // 2. Check out the issue branch; errors surface scrubbed and
        //    park the agent in ERROR.
        let worktree = match self.worktrees.prepare(&project, &agent, &branch).await {
            Ok(path) => path,
            Err(e) => {
                let detail = scrub(&e.to_string());
                self.fail_agent(&agent.id, issue_id, &detail);
                return Err(e.into());
            }
        };

        // 3. CHECKOUT -> WORKING.
        self.registry.transition(&agent.id, |lc| lc.begin_work())?;
        self.mirror(&agent.id);

        // 4-5. Build the prompt and start the subprocess.
        let handle = match self
            .executor
            .execute(&worktree, agent.id, &issue, stage, injection)
            .await
        {
            Ok(handle) => handle,
            Err(e) => {
                let detail = scrub(&e.to_string());
                self.fail_agent(&agent.id, issue_id, &detail);
                return Err(e);
            }
        };
        let run_id = handle.run_id();

        // 6. Reconcile the outcome in the background.
        let registry = self.registry.clone();
        let agents = Arc::clone(&self.agents);
        let issues = Arc::clone(&self.issues);
        let agent_id = agent.id;
        let clock = self.clock.clone();
        tokio::spawn(async move {
            let result = handle.wait().await;
            match result {
                Ok(outcome) if outcome.success => {
                    let _ = registry.transition(&agent_id, |lc| lc.complete());
                    let _ = registry.transition(&agent_id, |lc| lc.release());
                    tracing::info!(%run_id, agent_id = %agent_id, "dispatch complete");
                }
                Ok(outcome) => {
                    let error = outcome.error.unwrap_or_else(|| "agent failed".to_string());
                    let _ = registry.transition(&agent_id, |lc| {
                        lc.fail(error.clone());
                        Ok(())
                    });
                    tracing::warn!(%run_id, agent_id = %agent_id, %error, "dispatch failed");
                }
                Err(e) => {
                    let error = scrub(&e.to_string());
                    let _ = registry.transition(&agent_id, |lc| {
                        lc.fail(error.clone());
                        Ok(())
                    });
                    tracing::warn!(%run_id, agent_id = %agent_id, %error, "dispatch errored");
                }
            }
            mirror_record(&registry, &*agents, &agent_id, clock.epoch_ms());
            unbind_issue(&*issues, issue_id, agent_id);
        });

        Ok(run_id)
    }

    /// Explicitly release an agent out of DONE or ERROR.
    pub fn release_agent(&self, agent_id: &falcon_core::AgentId) -> Result<(), EngineError> {
        self.registry.transition(agent_id, |lc| lc.release())?;
        self.mirror(agent_id);
        Ok(())
    }

    fn fail_agent(&self, agent_id: &falcon_core::AgentId, issue_id: IssueId, detail: &str) {
        let _ = self.registry.transition(agent_id, |lc| {
            lc.fail(detail.to_string());
            Ok(())
        });
        self.mirror(agent_id);
        unbind_issue(&*self.issues, issue_id, *agent_id);
    }

    fn mirror(&self, agent_id: &falcon_core::AgentId) {
        mirror_record(&self.registry, &*self.agents, agent_id, self.clock.epoch_ms());
    }
}

/// Mirror the FSM phase into the persistent agent record.
fn mirror_record(
    registry: &AgentRegistry,
    agents: &dyn AgentRepo,
    agent_id: &falcon_core::AgentId,
    now_ms: u64,
) {
    let Some(lifecycle) = registry.lifecycle(agent_id) else {
        return;
    };
    let Ok(mut record) = agents.get(agent_id) else {
        return;
    };
    record.status = lifecycle.phase();
    record.current_issue_id = lifecycle.issue_id();
    record.last_error = lifecycle.last_error().map(str::to_string);
    record.updated_at_ms = now_ms;
    if let Err(e) = agents.update(record) {
        tracing::warn!(agent_id = %agent_id, error = %e, "agent record mirror failed");
    }
}

/// Clear the issue's agent binding, tolerating optimistic races.
fn unbind_issue(issues: &dyn IssueRepo, issue_id: IssueId, agent_id: falcon_core::AgentId) {
    for _ in 0..3 {
        let Ok(mut issue) = issues.get(&issue_id) else {
            return;
        };
        if issue.assigned_agent_id != Some(agent_id) {
            return;
        }
        issue.assigned_agent_id = None;
        match issues.update(issue) {
            Ok(_) => return,
            Err(falcon_storage::StorageError::StaleVersion { .. }) => continue,
            Err(e) => {
                tracing::warn!(issue_id = %issue_id, error = %e, "issue unbind failed");
                return;
            }
        }
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
