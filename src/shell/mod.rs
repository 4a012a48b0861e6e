//! Shell command execution and process-group helpers.

pub mod command;
pub mod platform;

pub use command::{execute, CommandOptions, CommandResult};
pub use platform::{is_ci, kill_group, process_exists, shell_command, terminate_group};
