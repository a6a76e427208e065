// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow executor: prompt construction and the invoker handoff.
//!
//! Angle brackets in user-controlled fields are escaped so an issue
//! title cannot smuggle structure into the prompt markup.

use crate::error::EngineError;
use falcon_core::{Issue, Stage};
use falcon_invoker::{AgentInvoker, InvokeRequest, RunHandle};
use std::path::Path;
use std::sync::Arc;

/// Escape `<` and `>` to their HTML entities.
pub fn escape_angle_brackets(s: &str) -> String {
    s.replace('<', "&lt;").replace('>', "&gt;")
}

/// The default stage prompt.
///
/// `injection` is the formatted warning block from the attribution
/// engine, prepended when non-empty.
pub fn build_prompt(stage: Stage, issue: &Issue, injection: &str) -> String {
    let mut prompt = String::new();
    if !injection.is_empty() {
        prompt.push_str(injection);
        if !injection.ends_with('\n') {
            prompt.push('\n');
        }
        prompt.push('\n');
    }
    prompt.push_str(&format!(
        "Stage: {}\n<issue-title>Issue #{}: {}</issue-title>\n\n<issue-description>{}</issue-description>",
        stage,
        issue.number,
        escape_angle_brackets(&issue.title),
        escape_angle_brackets(&issue.description),
    ));
    prompt
}

/// Builds prompts and hands them to the invoker.
pub struct WorkflowExecutor {
    invoker: Arc<dyn AgentInvoker>,
    tool_base_url: Option<String>,
    debug: bool,
}

impl WorkflowExecutor {
    pub fn new(invoker: Arc<dyn AgentInvoker>, tool_base_url: Option<String>, debug: bool) -> Self {
        Self { invoker, tool_base_url, debug }
    }

    /// Start one stage run for an issue in `workdir`.
    pub async fn execute(
        &self,
        workdir: &Path,
        agent_id: falcon_core::AgentId,
        issue: &Issue,
        stage: Stage,
        injection: &str,
    ) -> Result<RunHandle, EngineError> {
        let prompt = build_prompt(stage, issue, injection);
        let handle = self
            .invoker
            .invoke(
                workdir,
                InvokeRequest {
                    agent_id,
                    issue_id: issue.id,
                    stage,
                    prompt,
                    tool_base_url: self.tool_base_url.clone(),
                    debug: self.debug,
                },
            )
            .await?;
        tracing::info!(run_id = %handle.run_id(), issue = issue.number, stage = %stage, "workflow started");
        Ok(handle)
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
