//! Bounded shell command execution.

use crate::error::{ReadyCheckError, Result};
use crate::runner::InterruptFlag;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::PathBuf;
use std::process::{Child, ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::platform;

/// Number of trailing output lines kept in memory.
const TAIL_LINES: usize = 20;

/// How often a running command is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Result of executing a shell command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal or on timeout).
    pub exit_code: Option<i32>,

    /// Last lines of combined stdout and stderr.
    pub output_tail: Vec<String>,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,

    /// Whether the command was killed for exceeding its timeout.
    pub timed_out: bool,

    /// Whether the command was killed because the run was interrupted.
    pub interrupted: bool,
}

impl CommandResult {
    /// One-line summary for check details.
    pub fn summary(&self) -> String {
        if self.interrupted {
            format!("interrupted after {:.1}s", self.duration.as_secs_f64())
        } else if self.timed_out {
            format!("timed out after {}s", self.duration.as_secs())
        } else {
            match self.exit_code {
                Some(code) => format!("exit code {} in {:.1}s", code, self.duration.as_secs_f64()),
                None => "terminated by signal".to_string(),
            }
        }
    }
}

/// Options for command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Environment variables (merged with system env).
    pub env: HashMap<String, String>,

    /// Kill the command after this long (None = no timeout).
    pub timeout: Option<Duration>,

    /// File that receives stdout and stderr.
    pub log_path: Option<PathBuf>,

    /// Kill the command as soon as this trips.
    pub interrupt: InterruptFlag,
}

/// Execute a shell command, waiting at most `options.timeout`.
///
/// Output is streamed line by line into the log file, if any, and the last
/// lines are kept for the result. On timeout or interrupt the whole process
/// group is killed. When the shell exits on its own, anything it left running
/// in its group is killed too.
pub fn execute(command: &str, options: &CommandOptions) -> Result<CommandResult> {
    let start = Instant::now();

    let mut cmd = platform::shell_command(command);
    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }
    for (key, value) in &options.env {
        cmd.env(key, value);
    }
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let log = match &options.log_path {
        Some(path) => Some(File::create(path).map_err(|e| ReadyCheckError::CommandFailed {
            command: command.to_string(),
            message: format!("cannot create log {}: {}", path.display(), e),
        })?),
        None => None,
    };
    let sink = Arc::new(Mutex::new(OutputSink::new(log)));

    debug!("Running '{}'", command);
    let mut child = cmd.spawn().map_err(|e| ReadyCheckError::CommandFailed {
        command: command.to_string(),
        message: e.to_string(),
    })?;

    let readers: Vec<_> = [
        child.stdout.take().map(|s| Box::new(s) as Box<dyn Read + Send>),
        child.stderr.take().map(|s| Box::new(s) as Box<dyn Read + Send>),
    ]
    .into_iter()
    .flatten()
    .map(|stream| {
        let sink = Arc::clone(&sink);
        thread::spawn(move || {
            let reader = BufReader::new(stream);
            for line in reader.lines().map_while(std::result::Result::ok) {
                if let Ok(mut sink) = sink.lock() {
                    sink.push(line);
                }
            }
        })
    })
    .collect();

    let ending = wait_with_deadline(&mut child, options, command)?;

    for reader in readers {
        let _ = reader.join();
    }

    let duration = start.elapsed();
    let output_tail = sink
        .lock()
        .map(|sink| sink.tail.clone())
        .unwrap_or_default();
    let exit_code = match ending {
        Ending::Exited(status) => status.code(),
        Ending::TimedOut | Ending::Interrupted => None,
    };

    Ok(CommandResult {
        exit_code,
        output_tail,
        duration,
        success: exit_code == Some(0),
        timed_out: ending == Ending::TimedOut,
        interrupted: ending == Ending::Interrupted,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ending {
    Exited(ExitStatus),
    TimedOut,
    Interrupted,
}

fn wait_with_deadline(child: &mut Child, options: &CommandOptions, command: &str) -> Result<Ending> {
    let deadline = options.timeout.map(|t| Instant::now() + t);

    loop {
        if let Some(status) = child.try_wait()? {
            // Background jobs would otherwise keep the output pipes open.
            if platform::kill_group(child.id()) {
                debug!("Killed processes '{}' left behind", command);
            }
            return Ok(Ending::Exited(status));
        }

        let ending = if let Some(reason) = options.interrupt.reason() {
            warn!("Stopping '{}': {}", command, reason);
            Ending::Interrupted
        } else if deadline.is_some_and(|d| Instant::now() >= d) {
            warn!("'{}' exceeded its timeout, killing it", command);
            Ending::TimedOut
        } else {
            thread::sleep(POLL_INTERVAL);
            continue;
        };

        if !platform::kill_group(child.id()) {
            let _ = child.kill();
        }
        let _ = child.wait();
        return Ok(ending);
    }
}

struct OutputSink {
    log: Option<File>,
    tail: Vec<String>,
}

impl OutputSink {
    fn new(log: Option<File>) -> Self {
        Self {
            log,
            tail: Vec::new(),
        }
    }

    fn push(&mut self, line: String) {
        if let Some(log) = self.log.as_mut() {
            let _ = writeln!(log, "{}", line);
        }
        if self.tail.len() == TAIL_LINES {
            self.tail.remove(0);
        }
        self.tail.push(line);
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn execute_successful_command() {
        let result = execute("echo hello", &CommandOptions::default()).unwrap();

        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert_eq!(result.output_tail, vec!["hello".to_string()]);
    }

    #[test]
    fn execute_failing_command() {
        let result = execute("exit 3", &CommandOptions::default()).unwrap();

        assert!(!result.success);
        assert!(!result.timed_out);
        assert_eq!(result.exit_code, Some(3));
        assert_eq!(result.summary().split(' ').take(3).collect::<Vec<_>>(), ["exit", "code", "3"]);
    }

    #[test]
    fn execute_with_env_and_cwd() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut options = CommandOptions {
            cwd: Some(temp.path().to_path_buf()),
            ..Default::default()
        };
        options.env.insert("MY_VAR".to_string(), "my_value".to_string());

        let result = execute("echo $MY_VAR; touch marker", &options).unwrap();

        assert!(result.success);
        assert_eq!(result.output_tail[0], "my_value");
        assert!(temp.path().join("marker").exists());
    }

    #[test]
    fn timeout_kills_the_command() {
        let options = CommandOptions {
            timeout: Some(Duration::from_millis(300)),
            ..Default::default()
        };

        let started = Instant::now();
        let result = execute("sleep 30", &options).unwrap();

        assert!(result.timed_out);
        assert!(!result.success);
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn interrupt_kills_a_command_without_timeout() {
        let interrupt = InterruptFlag::new();
        let options = CommandOptions {
            interrupt: interrupt.clone(),
            ..Default::default()
        };
        let trip = thread::spawn(move || {
            thread::sleep(Duration::from_millis(200));
            interrupt.trigger();
        });

        let started = Instant::now();
        let result = execute("sleep 30", &options).unwrap();
        trip.join().unwrap();

        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(result.interrupted);
        assert!(!result.timed_out);
        assert!(!result.success);
        assert!(result.summary().starts_with("interrupted after"), "{}", result.summary());
    }

    #[test]
    fn run_deadline_kills_a_command() {
        let interrupt = InterruptFlag::new();
        interrupt.set_deadline(Duration::from_millis(300));
        let options = CommandOptions {
            interrupt,
            ..Default::default()
        };

        let started = Instant::now();
        let result = execute("sleep 30", &options).unwrap();

        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(result.interrupted);
    }

    #[test]
    fn background_jobs_are_killed_when_the_shell_exits() {
        let temp = tempfile::TempDir::new().unwrap();
        let pid_file = temp.path().join("job.pid");
        let options = CommandOptions {
            timeout: Some(Duration::from_secs(20)),
            ..Default::default()
        };

        let started = Instant::now();
        let result = execute(
            &format!("sleep 30 & echo $! > {}; echo done", pid_file.display()),
            &options,
        )
        .unwrap();

        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(result.success);
        assert_eq!(result.output_tail, vec!["done".to_string()]);

        let job: u32 = std::fs::read_to_string(&pid_file).unwrap().trim().parse().unwrap();
        assert!(platform::exits_within(job, Duration::from_secs(5)));
    }

    #[test]
    fn output_is_written_to_log_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let log_path = temp.path().join("suite.log");
        let options = CommandOptions {
            log_path: Some(log_path.clone()),
            ..Default::default()
        };

        execute("echo out; echo err >&2", &options).unwrap();

        let log = std::fs::read_to_string(&log_path).unwrap();
        assert!(log.contains("out"));
        assert!(log.contains("err"));
    }

    #[test]
    fn tail_keeps_last_lines_only() {
        let result = execute("i=0; while [ $i -lt 50 ]; do echo line$i; i=$((i+1)); done", &CommandOptions::default()).unwrap();

        assert_eq!(result.output_tail.len(), TAIL_LINES);
        assert_eq!(result.output_tail.last().map(String::as_str), Some("line49"));
    }
}
