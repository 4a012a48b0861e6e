//! Supervision of the process a run depends on.
//!
//! The supervisor is a small state machine around one child process: it
//! spawns it with output captured to a log file, polls a readiness probe
//! within a fixed budget, and guarantees termination (graceful first, then
//! forced) on every exit path including drop.

pub mod process;
pub mod state;

pub use process::{
    ProcessHandle, ProcessSpec, ProcessSupervisor, ReadinessPolicy, StopOutcome, SupervisorSummary,
};
pub use state::ProcessState;
