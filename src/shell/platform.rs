//! Platform-specific process helpers.

use std::process::Command;

/// Build a command that runs `command` through the platform shell.
///
/// Uses `sh -c` on Unix and `cmd /C` on Windows. On Unix the child is put in
/// its own process group so it can be signalled as a unit.
pub fn shell_command(command: &str) -> Command {
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;

        let mut cmd = Command::new("/bin/sh");
        cmd.arg("-c").arg(command);
        cmd.process_group(0);
        cmd
    }

    #[cfg(not(unix))]
    {
        let shell = std::env::var("COMSPEC").unwrap_or_else(|_| "cmd.exe".to_string());
        let mut cmd = Command::new(shell);
        cmd.arg("/C").arg(command);
        cmd
    }
}

/// Ask a process group to terminate (SIGTERM).
///
/// Returns false if the group no longer exists. No-op elsewhere.
pub fn terminate_group(pid: u32) -> bool {
    signal_group(pid, Signal::Terminate)
}

/// Forcibly kill a process group (SIGKILL).
pub fn kill_group(pid: u32) -> bool {
    signal_group(pid, Signal::Kill)
}

/// Whether a process with this id is still running.
///
/// On Linux a zombie waiting to be reaped by its new parent does not count.
pub fn process_exists(pid: u32) -> bool {
    #[cfg(unix)]
    {
        // SAFETY: signal 0 performs error checking only; no signal is sent.
        let exists = unsafe { libc::kill(pid as libc::pid_t, 0) == 0 };
        exists && !is_zombie(pid)
    }

    #[cfg(not(unix))]
    {
        let _ = pid;
        false
    }
}

#[cfg(target_os = "linux")]
fn is_zombie(pid: u32) -> bool {
    // The state follows the parenthesised command name in /proc/<pid>/stat.
    std::fs::read_to_string(format!("/proc/{}/stat", pid))
        .ok()
        .and_then(|stat| {
            stat.rsplit_once(')')
                .and_then(|(_, rest)| rest.split_whitespace().next().map(|state| state == "Z"))
        })
        .unwrap_or(false)
}

#[cfg(all(unix, not(target_os = "linux")))]
fn is_zombie(_pid: u32) -> bool {
    false
}

/// Poll until `pid` is gone or `timeout` elapses; true if it is gone.
#[cfg(test)]
pub(crate) fn exits_within(pid: u32, timeout: std::time::Duration) -> bool {
    let deadline = std::time::Instant::now() + timeout;
    while process_exists(pid) {
        if std::time::Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(std::time::Duration::from_millis(20));
    }
    true
}

/// Check if running in a CI environment.
///
/// Checks common CI environment variables: `CI`, `GITHUB_ACTIONS`,
/// `GITLAB_CI`, `CIRCLECI`, `TRAVIS`, `JENKINS_URL`.
pub fn is_ci() -> bool {
    ["CI", "GITHUB_ACTIONS", "GITLAB_CI", "CIRCLECI", "TRAVIS", "JENKINS_URL"]
        .iter()
        .any(|key| std::env::var(key).is_ok())
}

#[derive(Clone, Copy)]
enum Signal {
    Terminate,
    Kill,
}

fn signal_group(pid: u32, signal: Signal) -> bool {
    #[cfg(unix)]
    {
        let sig = match signal {
            Signal::Terminate => libc::SIGTERM,
            Signal::Kill => libc::SIGKILL,
        };
        // SAFETY: kill(2) with a negative pid targets the process group led
        // by `pid`; it has no memory-safety preconditions.
        unsafe { libc::kill(-(pid as libc::pid_t), sig) == 0 }
    }

    #[cfg(not(unix))]
    {
        let _ = (pid, signal);
        false
    }
}
