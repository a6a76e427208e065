// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess invokers.
//!
//! `invoke` validates the prompt, allocates the run id, and returns a
//! [`RunHandle`] immediately; the subprocess itself runs in a spawned
//! task behind the concurrency gate. Callers subscribe to the output
//! bus with the returned run id, then await the handle for the
//! outcome.

use crate::error::InvokerError;
use crate::stream::{FrameExtractor, LineBuffer};
use async_trait::async_trait;
use falcon_bus::OutputBus;
use falcon_core::{scrub, AgentId, Clock, IssueId, OutputLine, RunId, Stage, SystemClock};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdout};
use tokio::sync::Semaphore;

/// Prompt cap, in UTF-8 bytes. A prompt of exactly this size passes.
pub const PROMPT_MAX_BYTES: usize = 50 * 1024;

/// Hard wall clock per run.
pub const RUN_TIMEOUT: Duration = Duration::from_secs(300);

/// Delay between graceful and forceful termination.
pub const KILL_GRACE: Duration = Duration::from_secs(5);

/// Simultaneous subprocesses per invoker. Excess callers queue FIFO.
pub const MAX_CONCURRENT_RUNS: usize = 5;

/// Configuration for an invoker instance.
#[derive(Debug, Clone)]
pub struct InvokerConfig {
    /// Agent executable.
    pub program: String,
    /// Base arguments, before any per-run environment.
    pub args: Vec<String>,
    pub timeout: Duration,
    pub grace: Duration,
    pub max_concurrency: usize,
    pub prompt_max_bytes: usize,
}

impl Default for InvokerConfig {
    fn default() -> Self {
        Self {
            program: "falcon-agent".to_string(),
            args: Vec::new(),
            timeout: RUN_TIMEOUT,
            grace: KILL_GRACE,
            max_concurrency: MAX_CONCURRENT_RUNS,
            prompt_max_bytes: PROMPT_MAX_BYTES,
        }
    }
}

/// One dispatch handed to an invoker.
#[derive(Debug, Clone)]
pub struct InvokeRequest {
    pub agent_id: AgentId,
    pub issue_id: IssueId,
    pub stage: Stage,
    pub prompt: String,
    pub tool_base_url: Option<String>,
    pub debug: bool,
}

/// Result of a finished run.
#[derive(Debug, Clone)]
pub struct InvokeOutcome {
    pub run_id: RunId,
    pub success: bool,
    /// Scrubbed failure description when `success` is false.
    pub error: Option<String>,
}

/// Handle to a run in flight. The run id is valid for bus subscription
/// as soon as the handle exists.
#[derive(Debug)]
pub struct RunHandle {
    run_id: RunId,
    task: tokio::task::JoinHandle<Result<InvokeOutcome, InvokerError>>,
}

impl RunHandle {
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Await the subprocess outcome.
    pub async fn wait(self) -> Result<InvokeOutcome, InvokerError> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(InvokerError::Internal { detail: e.to_string() }),
        }
    }
}

/// The invoker seam the dispatcher talks to.
#[async_trait]
pub trait AgentInvoker: Send + Sync {
    /// Start the agent subprocess in `workdir` for one stage.
    ///
    /// Fails fast on `PromptTooLarge`; every later failure is reported
    /// through the handle.
    async fn invoke(&self, workdir: &Path, req: InvokeRequest)
        -> Result<RunHandle, InvokerError>;
}

/// Invoker that parses stream-JSON stdout and publishes lines.
pub struct StreamingInvoker<C: Clock = SystemClock> {
    config: InvokerConfig,
    bus: OutputBus,
    clock: C,
    semaphore: Arc<Semaphore>,
}

impl StreamingInvoker<SystemClock> {
    pub fn new(config: InvokerConfig, bus: OutputBus) -> Self {
        Self::with_clock(config, bus, SystemClock)
    }
}

impl<C: Clock> StreamingInvoker<C> {
    pub fn with_clock(config: InvokerConfig, bus: OutputBus, clock: C) -> Self {
        let permits = config.max_concurrency;
        Self { config, bus, clock, semaphore: Arc::new(Semaphore::new(permits)) }
    }
}

#[async_trait]
impl<C: Clock + 'static> AgentInvoker for StreamingInvoker<C> {
    async fn invoke(
        &self,
        workdir: &Path,
        req: InvokeRequest,
    ) -> Result<RunHandle, InvokerError> {
        start_run(
            self.config.clone(),
            Arc::clone(&self.semaphore),
            workdir.to_path_buf(),
            req,
            Some((self.bus.clone(), self.clock.clone())),
        )
    }
}

/// Invoker that discards stdout entirely.
pub struct SilentInvoker {
    config: InvokerConfig,
    semaphore: Arc<Semaphore>,
}

impl SilentInvoker {
    pub fn new(config: InvokerConfig) -> Self {
        let permits = config.max_concurrency;
        Self { config, semaphore: Arc::new(Semaphore::new(permits)) }
    }
}

#[async_trait]
impl AgentInvoker for SilentInvoker {
    async fn invoke(
        &self,
        workdir: &Path,
        req: InvokeRequest,
    ) -> Result<RunHandle, InvokerError> {
        start_run::<SystemClock>(
            self.config.clone(),
            Arc::clone(&self.semaphore),
            workdir.to_path_buf(),
            req,
            None,
        )
    }
}

fn start_run<C: Clock + 'static>(
    config: InvokerConfig,
    semaphore: Arc<Semaphore>,
    workdir: PathBuf,
    req: InvokeRequest,
    stream_to: Option<(OutputBus, C)>,
) -> Result<RunHandle, InvokerError> {
    let prompt_bytes = req.prompt.len();
    if prompt_bytes > config.prompt_max_bytes {
        return Err(InvokerError::PromptTooLarge {
            bytes: prompt_bytes,
            max: config.prompt_max_bytes,
        });
    }

    let run_id = RunId::new();
    let task = tokio::spawn(async move {
        // FIFO gate: tokio semaphores queue acquirers in arrival order.
        let _permit = semaphore
            .acquire_owned()
            .await
            .map_err(|e| InvokerError::Internal { detail: e.to_string() })?;
        run_subprocess(&config, &workdir, run_id, req, stream_to).await
    });

    Ok(RunHandle { run_id, task })
}

async fn run_subprocess<C: Clock + 'static>(
    config: &InvokerConfig,
    workdir: &Path,
    run_id: RunId,
    req: InvokeRequest,
    stream_to: Option<(OutputBus, C)>,
) -> Result<InvokeOutcome, InvokerError> {
    let capture_stdout = stream_to.is_some() && req.debug;

    let mut cmd = tokio::process::Command::new(&config.program);
    cmd.args(&config.args)
        .current_dir(workdir)
        .env("FALCON_RUN_ID", run_id.as_str())
        .env("FALCON_AGENT_ID", req.agent_id.as_str())
        .env("FALCON_ISSUE_ID", req.issue_id.to_string())
        .env("FALCON_STAGE", req.stage.to_string())
        .stdin(Stdio::piped())
        .stdout(if capture_stdout { Stdio::piped() } else { Stdio::null() })
        .stderr(Stdio::null())
        .kill_on_drop(true);
    if let Some(url) = &req.tool_base_url {
        cmd.env("FALCON_TOOL_BASE_URL", url);
    }

    let mut child = cmd
        .spawn()
        .map_err(|e| InvokerError::Internal { detail: scrub(&e.to_string()) })?;

    // Deliver the prompt and close stdin so the agent sees EOF.
    if let Some(mut stdin) = child.stdin.take() {
        if let Err(e) = stdin.write_all(req.prompt.as_bytes()).await {
            tracing::warn!(%run_id, error = %e, "prompt write failed");
        }
    }

    let reader = match (child.stdout.take(), stream_to) {
        (Some(stdout), Some((bus, clock))) => Some(tokio::spawn(stream_output(
            stdout,
            bus,
            clock,
            run_id,
            req.agent_id,
            req.issue_id,
        ))),
        _ => None,
    };

    tracing::info!(%run_id, agent_id = %req.agent_id, stage = %req.stage, "run started");

    let status = tokio::select! {
        status = child.wait() => Some(status),
        _ = tokio::time::sleep(config.timeout) => None,
    };

    let status = match status {
        Some(status) => status,
        None => {
            terminate(&mut child, config.grace).await;
            if let Some(reader) = reader {
                let _ = reader.await;
            }
            tracing::warn!(%run_id, seconds = config.timeout.as_secs(), "run timed out");
            return Err(InvokerError::Timeout { run_id, seconds: config.timeout.as_secs() });
        }
    };

    if let Some(reader) = reader {
        let _ = reader.await;
    }

    match status {
        Ok(status) if status.success() => {
            tracing::info!(%run_id, "run finished");
            Ok(InvokeOutcome { run_id, success: true, error: None })
        }
        Ok(status) => {
            let detail = format!("agent exited with {}", status);
            tracing::warn!(%run_id, %detail, "run failed");
            Ok(InvokeOutcome { run_id, success: false, error: Some(scrub(&detail)) })
        }
        Err(e) => Err(InvokerError::Internal { detail: scrub(&e.to_string()) }),
    }
}

/// SIGTERM, wait out the grace period, then SIGKILL.
async fn terminate(child: &mut Child, grace: Duration) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;
        let _ = kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
    }

    if tokio::time::timeout(grace, child.wait()).await.is_err() {
        let _ = child.kill().await;
    }
}

/// Read stream-JSON frames from stdout, extract text, publish lines.
async fn stream_output<C: Clock>(
    stdout: ChildStdout,
    bus: OutputBus,
    clock: C,
    run_id: RunId,
    agent_id: AgentId,
    issue_id: IssueId,
) {
    let mut frames = BufReader::new(stdout).lines();
    let mut extractor = FrameExtractor::new();
    let mut buffer = LineBuffer::new();

    while let Ok(Some(frame)) = frames.next_line().await {
        let Some(text) = extractor.extract(&frame) else {
            continue;
        };
        for line in buffer.push(&text) {
            publish(&bus, &clock, run_id, agent_id, issue_id, line);
        }
    }
    if let Some(rest) = buffer.flush() {
        publish(&bus, &clock, run_id, agent_id, issue_id, rest);
    }
}

fn publish<C: Clock>(
    bus: &OutputBus,
    clock: &C,
    run_id: RunId,
    agent_id: AgentId,
    issue_id: IssueId,
    line: String,
) {
    bus.publish(OutputLine {
        run_id,
        agent_id,
        issue_id,
        line: scrub(&line),
        at: clock.epoch_ms(),
    });
}

#[cfg(test)]
#[path = "invoker_tests.rs"]
mod tests;
