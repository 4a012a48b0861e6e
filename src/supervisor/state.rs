//! Lifecycle states of a supervised process.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of the dependent process.
///
/// `NotStarted → Starting → Ready → Running → Terminating → Stopped`, with
/// `Failed` reachable from any non-terminal state. `Stopped` and `Failed`
/// are terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum ProcessState {
    NotStarted,
    Starting,
    Ready,
    Running,
    Terminating,
    Stopped,
    Failed(String),
}

impl ProcessState {
    /// Whether no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcessState::Stopped | ProcessState::Failed(_))
    }

    /// Whether the transition `self → next` is allowed.
    pub fn can_transition_to(&self, next: &ProcessState) -> bool {
        use ProcessState::*;

        if let Failed(_) = next {
            return !self.is_terminal();
        }
        matches!(
            (self, next),
            (NotStarted, Starting)
                | (Starting, Ready)
                | (Ready, Running)
                | (Ready, Terminating)
                | (Running, Terminating)
                | (Terminating, Stopped)
        )
    }

    /// Failure reason, if failed.
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            ProcessState::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    /// Short label for logs and the console.
    pub fn label(&self) -> &'static str {
        match self {
            ProcessState::NotStarted => "not started",
            ProcessState::Starting => "starting",
            ProcessState::Ready => "ready",
            ProcessState::Running => "running",
            ProcessState::Terminating => "terminating",
            ProcessState::Stopped => "stopped",
            ProcessState::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessState::Failed(reason) => write!(f, "failed: {}", reason),
            other => f.write_str(other.label()),
        }
    }
}
