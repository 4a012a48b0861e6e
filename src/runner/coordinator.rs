//! Run orchestration.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::checks::{Category, Check, CheckContext, CheckVerdict};
use crate::error::Result;
use crate::results::{CheckResult, ResultRecorder};
use crate::scoring::{score_grouped, RunVerdict};
use crate::secrets::Redactor;
use crate::supervisor::{ProcessSupervisor, StopOutcome, SupervisorSummary};

use super::interrupt::InterruptFlag;

/// Progress events emitted during a run.
#[derive(Debug)]
pub enum RunProgress<'a> {
    /// The dependent process is being launched.
    ServerStarting { command: &'a str },
    /// The dependent process passed its readiness probe.
    ServerReady { after: Duration },
    /// The dependent process was released.
    ServerStopped { outcome: StopOutcome },
    /// A category is about to run.
    CategoryStarting {
        name: &'a str,
        index: usize,
        total: usize,
        checks: usize,
    },
    /// A check's result was recorded.
    CheckFinished { result: &'a CheckResult },
    /// Every check of a category was recorded.
    CategoryFinished {
        name: &'a str,
        passed: usize,
        total: usize,
    },
    /// The run stopped early; `skipped` checks were not executed.
    Aborted { reason: &'a str, skipped: usize },
}

/// Everything a finished run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub recorder: ResultRecorder,
    pub verdict: RunVerdict,
    /// Set when the run stopped early (signal or run timeout).
    pub interrupted: Option<String>,
    /// Checks that were not executed because the run stopped early.
    pub skipped: usize,
    pub duration: Duration,
    pub server: Option<SupervisorSummary>,
}

impl RunOutcome {
    /// 130 when interrupted, otherwise the verdict's exit code.
    pub fn exit_code(&self) -> i32 {
        if self.interrupted.is_some() {
            130
        } else {
            self.verdict.exit_code()
        }
    }
}

/// Sequences categories of checks inside an optional supervisor scope.
///
/// # Example
///
/// ```no_run
/// use readycheck::checks::{Category, CheckContext, CheckVerdict};
/// use readycheck::probe::{ProbeExecutor, ProbeRequest};
/// use readycheck::runner::RunCoordinator;
/// use std::time::Duration;
///
/// let executor = ProbeExecutor::new("http://localhost:3001", Duration::from_secs(10), false)?;
/// let ctx = CheckContext::new(executor);
///
/// let smoke = Category::new("Smoke").check("Health", |ctx| {
///     Ok(CheckVerdict::from(&ctx.probe(ProbeRequest::get("/api/health"))))
/// });
///
/// let outcome = RunCoordinator::new(vec![smoke]).run(&ctx, |_| {})?;
/// println!("{:.1}", outcome.verdict.display_score());
/// # Ok::<(), readycheck::ReadyCheckError>(())
/// ```
pub struct RunCoordinator {
    categories: Vec<Category>,
    supervisor: Option<ProcessSupervisor>,
    interrupt: InterruptFlag,
    run_timeout: Option<Duration>,
    parallel: bool,
    redactor: Redactor,
}

impl RunCoordinator {
    pub fn new(categories: Vec<Category>) -> Self {
        Self {
            categories,
            supervisor: None,
            interrupt: InterruptFlag::new(),
            run_timeout: None,
            parallel: false,
            redactor: Redactor::new(),
        }
    }

    /// Start this process before the first check and stop it after the last.
    pub fn with_supervisor(mut self, supervisor: ProcessSupervisor) -> Self {
        self.supervisor = Some(supervisor);
        self
    }

    /// Flag that stops the run. It is attached to the check context so
    /// long-running checks can observe it.
    pub fn with_interrupt(mut self, interrupt: InterruptFlag) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Stop the run once it has taken this long.
    ///
    /// Running external commands and readiness polling are cut short as
    /// well; checks already in flight are recorded.
    pub fn with_run_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.run_timeout = timeout;
        self
    }

    /// Run checks of parallel categories concurrently.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Mask details with `redactor` before recording.
    pub fn with_redactor(mut self, redactor: Redactor) -> Self {
        self.redactor = redactor;
        self
    }

    /// Execute every category and score the results.
    ///
    /// # Errors
    ///
    /// Returns `ProcessLifecycle` if the dependent process fails to become
    /// ready. The process is released before this returns on every path.
    pub fn run(
        mut self,
        ctx: &CheckContext,
        mut on_progress: impl FnMut(RunProgress<'_>),
    ) -> Result<RunOutcome> {
        let started = Instant::now();
        let mut recorder = ResultRecorder::new();

        if let Some(timeout) = self.run_timeout {
            self.interrupt.set_deadline(timeout);
        }
        ctx.attach_interrupt(self.interrupt.clone());

        if let Some(supervisor) = self.supervisor.as_mut() {
            on_progress(RunProgress::ServerStarting {
                command: supervisor.command(),
            });
            let server_started = Instant::now();
            if let Err(err) = supervisor.start(ctx.executor(), &self.interrupt) {
                let outcome = supervisor.stop();
                on_progress(RunProgress::ServerStopped { outcome });

                if let Some(reason) = self.interrupt.reason() {
                    warn!("Interrupted while waiting for '{}'", supervisor.command());
                    let skipped = self.categories.iter().map(Category::len).sum();
                    on_progress(RunProgress::Aborted {
                        reason: &reason,
                        skipped,
                    });
                    let summary = supervisor.summary();
                    return Ok(finish(recorder, Some(reason), skipped, started, Some(summary)));
                }
                return Err(err);
            }
            on_progress(RunProgress::ServerReady {
                after: server_started.elapsed(),
            });
        }

        let total = self.categories.len();
        let mut interrupted = None;
        let mut skipped = 0;

        for (index, category) in self.categories.iter().enumerate() {
            recorder.declare_category(&category.name);

            if interrupted.is_none() {
                interrupted = self.interrupt.reason();
            }
            if interrupted.is_some() {
                skipped += category.len();
                continue;
            }

            on_progress(RunProgress::CategoryStarting {
                name: &category.name,
                index,
                total,
                checks: category.len(),
            });
            let before = recorder.len();

            if self.parallel && category.parallel {
                debug!("Running '{}' in parallel", category.name);
                for (check, verdict) in category.checks.iter().zip(run_parallel(category, ctx)) {
                    let result = self.record(&mut recorder, category, check, verdict);
                    on_progress(RunProgress::CheckFinished { result });
                }
            } else {
                for (position, check) in category.checks.iter().enumerate() {
                    if let Some(reason) = self.interrupt.reason() {
                        interrupted = Some(reason);
                        skipped += category.len() - position;
                        break;
                    }
                    let verdict = run_isolated(check, ctx);
                    let result = self.record(&mut recorder, category, check, verdict);
                    on_progress(RunProgress::CheckFinished { result });
                }
            }

            let recorded = &recorder.all()[before..];
            on_progress(RunProgress::CategoryFinished {
                name: &category.name,
                passed: recorded.iter().filter(|r| r.passed()).count(),
                total: recorded.len(),
            });
        }

        if interrupted.is_none() {
            // Tripped while the last check ran; that check was cut short.
            interrupted = self.interrupt.reason();
        }
        if let Some(reason) = &interrupted {
            warn!("Run stopped early: {}", reason);
            on_progress(RunProgress::Aborted { reason, skipped });
        }

        let server = self.supervisor.as_mut().map(|supervisor| {
            let outcome = supervisor.stop();
            on_progress(RunProgress::ServerStopped { outcome });
            supervisor.summary()
        });

        Ok(finish(recorder, interrupted, skipped, started, server))
    }

    fn record<'r>(
        &self,
        recorder: &'r mut ResultRecorder,
        category: &Category,
        check: &Check,
        verdict: CheckVerdict,
    ) -> &'r CheckResult {
        let detail = self.redactor.redact(&verdict.detail);
        debug!("{} / {}: {} {}", category.name, check.name(), verdict.outcome, detail);
        recorder.record(&category.name, check.name(), verdict.outcome, detail)
    }
}

fn finish(
    recorder: ResultRecorder,
    interrupted: Option<String>,
    skipped: usize,
    started: Instant,
    server: Option<SupervisorSummary>,
) -> RunOutcome {
    let verdict = score_grouped(&recorder.by_category());
    info!(
        "Run finished: {} checks, score {:.1} ({})",
        verdict.total_checks,
        verdict.display_score(),
        verdict.tier
    );
    RunOutcome {
        recorder,
        verdict,
        interrupted,
        skipped,
        duration: started.elapsed(),
        server,
    }
}

/// Run a check, turning an `Err` or a panic into FAIL.
pub fn run_isolated(check: &Check, ctx: &CheckContext) -> CheckVerdict {
    match panic::catch_unwind(AssertUnwindSafe(|| check.run(ctx))) {
        Ok(Ok(verdict)) => verdict,
        Ok(Err(err)) => CheckVerdict::fail(format!("{:#}", err)),
        Err(payload) => {
            warn!("Check '{}' panicked", check.name());
            CheckVerdict::fail(format!("check panicked: {}", panic_message(payload.as_ref())))
        }
    }
}

/// Run every check of `category` on its own scoped thread.
///
/// Verdicts are returned in declaration order.
fn run_parallel(category: &Category, ctx: &CheckContext) -> Vec<CheckVerdict> {
    thread::scope(|scope| {
        let handles: Vec<_> = category
            .checks
            .iter()
            .map(|check| scope.spawn(move || run_isolated(check, ctx)))
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle.join().unwrap_or_else(|payload| {
                    CheckVerdict::fail(format!("check panicked: {}", panic_message(payload.as_ref())))
                })
            })
            .collect()
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
