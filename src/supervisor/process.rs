//! Start, health-check, and stop the dependent process.

use std::collections::HashMap;
use std::fs::{self, File};
use std::path::PathBuf;
use std::process::{Child, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ReadyCheckError, Result};
use crate::probe::{format_secs, ProbeExecutor, ProbeRequest};
use crate::runner::InterruptFlag;
use crate::shell::platform;

use super::state::ProcessState;

/// How often the child is checked while waiting for it to exit.
const EXIT_POLL: Duration = Duration::from_millis(50);

/// What to launch.
#[derive(Debug, Clone)]
pub struct ProcessSpec {
    /// Shell command line.
    pub command: String,
    /// Working directory.
    pub cwd: Option<PathBuf>,
    /// Extra environment variables.
    pub env: HashMap<String, String>,
    /// File receiving stdout and stderr.
    pub log_path: PathBuf,
}

/// When the process counts as ready.
#[derive(Debug, Clone)]
pub struct ReadinessPolicy {
    /// Probe that must meet its expectation.
    pub probe: ProbeRequest,
    /// Delay between probes.
    pub interval: Duration,
    /// Total readiness budget.
    pub timeout: Duration,
}

/// Live state of the supervised process.
#[derive(Debug, Clone)]
pub struct ProcessHandle {
    pub state: ProcessState,
    pub pid: Option<u32>,
    pub started_at: Option<DateTime<Utc>>,
    pub log_sink: PathBuf,
}

/// How [`ProcessSupervisor::stop`] ended the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopOutcome {
    /// Nothing was running.
    NotRunning,
    /// The process exited within the grace period.
    Graceful,
    /// The process had to be killed.
    Forced,
}

/// Snapshot of the supervisor for reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisorSummary {
    pub command: String,
    #[serde(flatten)]
    pub state: ProcessState,
    pub pid: Option<u32>,
    pub started_at: Option<DateTime<Utc>>,
    pub ready_after_ms: Option<u64>,
    pub stop: Option<StopOutcome>,
    pub log_path: PathBuf,
}

/// Owns the dependent process for the duration of a run.
///
/// The process is released exactly once: by [`stop`](Self::stop), by a
/// failed [`start`](Self::start), or on drop.
#[derive(Debug)]
pub struct ProcessSupervisor {
    spec: ProcessSpec,
    readiness: ReadinessPolicy,
    grace: Duration,
    handle: ProcessHandle,
    child: Option<Child>,
    ready_after: Option<Duration>,
    stop_outcome: Option<StopOutcome>,
}

impl ProcessSupervisor {
    /// Create a supervisor. Nothing is spawned until [`start`](Self::start).
    pub fn new(spec: ProcessSpec, readiness: ReadinessPolicy, grace: Duration) -> Self {
        let handle = ProcessHandle {
            state: ProcessState::NotStarted,
            pid: None,
            started_at: None,
            log_sink: spec.log_path.clone(),
        };
        Self {
            spec,
            readiness,
            grace,
            handle,
            child: None,
            ready_after: None,
            stop_outcome: None,
        }
    }

    pub fn state(&self) -> &ProcessState {
        &self.handle.state
    }

    pub fn handle(&self) -> &ProcessHandle {
        &self.handle
    }

    pub fn command(&self) -> &str {
        &self.spec.command
    }

    /// Spawn the process and wait until the readiness probe succeeds.
    ///
    /// On failure the process is already released when this returns.
    pub fn start(&mut self, executor: &ProbeExecutor, interrupt: &InterruptFlag) -> Result<()> {
        if self.handle.state != ProcessState::NotStarted {
            return Err(self.lifecycle_error(format!("cannot start from state '{}'", self.handle.state)));
        }
        self.transition(ProcessState::Starting);

        if let Err(reason) = self.spawn() {
            return Err(self.fail(reason));
        }

        let budget = self.readiness.timeout;
        let started = Instant::now();
        let deadline = started + budget;
        let probe_timeout = self
            .readiness
            .probe
            .timeout
            .unwrap_or_else(|| executor.default_timeout());

        loop {
            if interrupt.is_set() {
                return Err(self.fail("interrupted before ready".to_string()));
            }
            if let Some(status) = self.child_exit_status() {
                return Err(self.fail(format!("exited before ready ({})", status)));
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(self.fail(format!(
                    "did not become ready within {}",
                    format_secs(budget)
                )));
            }

            let probe = self
                .readiness
                .probe
                .clone()
                .timeout(probe_timeout.min(remaining));
            let outcome = executor.execute(&probe);
            if outcome.met_expectation() {
                let elapsed = started.elapsed();
                self.ready_after = Some(elapsed);
                self.transition(ProcessState::Ready);
                info!("'{}' ready after {:?}", self.spec.command, elapsed);
                self.transition(ProcessState::Running);
                return Ok(());
            }
            debug!("Readiness probe not yet satisfied: {}", outcome.detail());

            let remaining = deadline.saturating_duration_since(Instant::now());
            thread::sleep(self.readiness.interval.min(remaining));
        }
    }

    /// Stop the process. Never errors; safe to call any number of times.
    pub fn stop(&mut self) -> StopOutcome {
        let outcome = match self.handle.state.clone() {
            ProcessState::NotStarted | ProcessState::Stopped => return StopOutcome::NotRunning,
            ProcessState::Failed(_) => self.release(),
            ProcessState::Starting => {
                self.transition(ProcessState::Failed("stopped before ready".to_string()));
                self.release()
            }
            ProcessState::Ready | ProcessState::Running | ProcessState::Terminating => {
                if self.handle.state != ProcessState::Terminating {
                    self.transition(ProcessState::Terminating);
                }
                let outcome = self.release();
                self.transition(ProcessState::Stopped);
                outcome
            }
        };

        if outcome != StopOutcome::NotRunning {
            info!("Stopped '{}' ({:?})", self.spec.command, outcome);
            self.stop_outcome = Some(outcome);
        }
        outcome
    }

    /// Report snapshot.
    pub fn summary(&self) -> SupervisorSummary {
        SupervisorSummary {
            command: self.spec.command.clone(),
            state: self.handle.state.clone(),
            pid: self.handle.pid,
            started_at: self.handle.started_at,
            ready_after_ms: self.ready_after.map(|d| d.as_millis() as u64),
            stop: self.stop_outcome,
            log_path: self.spec.log_path.clone(),
        }
    }

    fn spawn(&mut self) -> std::result::Result<(), String> {
        if let Some(parent) = self.spec.log_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| format!("cannot create {}: {}", parent.display(), e))?;
            }
        }
        let log = File::create(&self.spec.log_path)
            .map_err(|e| format!("cannot create log {}: {}", self.spec.log_path.display(), e))?;
        let log_err = log
            .try_clone()
            .map_err(|e| format!("cannot share log handle: {}", e))?;

        let mut cmd = platform::shell_command(&self.spec.command);
        if let Some(cwd) = &self.spec.cwd {
            cmd.current_dir(cwd);
        }
        for (key, value) in &self.spec.env {
            cmd.env(key, value);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(log_err));

        let child = cmd.spawn().map_err(|e| format!("failed to spawn: {}", e))?;
        info!("Started '{}' (pid {})", self.spec.command, child.id());

        self.handle.pid = Some(child.id());
        self.handle.started_at = Some(Utc::now());
        self.child = Some(child);
        Ok(())
    }

    /// Exit status of the group leader, if it has exited.
    ///
    /// The child stays owned so [`release`](Self::release) still sweeps the
    /// rest of its process group.
    fn child_exit_status(&mut self) -> Option<std::process::ExitStatus> {
        let child = self.child.as_mut()?;
        match child.try_wait() {
            Ok(Some(status)) => Some(status),
            Ok(None) => None,
            Err(e) => {
                warn!("Could not poll '{}': {}", self.spec.command, e);
                None
            }
        }
    }

    /// Terminate and reap the child, if any.
    fn release(&mut self) -> StopOutcome {
        let Some(mut child) = self.child.take() else {
            return StopOutcome::NotRunning;
        };
        let pid = child.id();

        if let Ok(Some(_)) = child.try_wait() {
            // Leader is gone; sweep anything left in its group.
            if platform::kill_group(pid) {
                debug!("Killed processes '{}' left behind", self.spec.command);
            }
            return StopOutcome::NotRunning;
        }

        if !platform::terminate_group(pid) {
            let _ = child.kill();
        }

        let deadline = Instant::now() + self.grace;
        while Instant::now() < deadline {
            if let Ok(Some(_)) = child.try_wait() {
                platform::kill_group(pid);
                return StopOutcome::Graceful;
            }
            thread::sleep(EXIT_POLL);
        }

        warn!(
            "'{}' ignored termination for {}, killing it",
            self.spec.command,
            format_secs(self.grace)
        );
        if !platform::kill_group(pid) {
            let _ = child.kill();
        }
        let _ = child.wait();
        StopOutcome::Forced
    }

    fn transition(&mut self, next: ProcessState) {
        if !self.handle.state.can_transition_to(&next) {
            warn!(
                "Ignoring invalid process transition {} -> {}",
                self.handle.state, next
            );
            return;
        }
        debug!("Process state {} -> {}", self.handle.state, next);
        self.handle.state = next;
    }

    fn fail(&mut self, reason: String) -> ReadyCheckError {
        warn!("'{}' failed: {}", self.spec.command, reason);
        self.transition(ProcessState::Failed(reason.clone()));
        self.stop();
        self.lifecycle_error(reason)
    }

    fn lifecycle_error(&self, reason: String) -> ReadyCheckError {
        ReadyCheckError::ProcessLifecycle {
            command: self.spec.command.clone(),
            reason,
        }
    }
}

impl Drop for ProcessSupervisor {
    fn drop(&mut self) {
        self.stop();
    }
}
