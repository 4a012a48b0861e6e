//! Console output.
//!
//! This module provides:
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] for interactive terminals (colors, spinners)
//! - [`NonInteractiveUI`] for CI logs and pipes
//! - [`MockUI`] capturing output for tests
//!
//! # Example
//!
//! ```
//! use readycheck::ui::{create_ui, OutputMode};
//!
//! let mut ui = create_ui(false, OutputMode::Quiet);
//! ui.show_header("Readiness assessment");
//! ui.success("Server ready");
//! ```

pub mod mock;
pub mod non_interactive;
pub mod output;
pub mod progress;
pub mod spinner;
pub mod summary;
pub mod terminal;
pub mod theme;

pub use mock::{MockSpinner, MockUI};
pub use non_interactive::NonInteractiveUI;
pub use output::OutputMode;
pub use progress::{format_duration, CategoryProgress};
pub use spinner::ProgressSpinner;
pub use summary::summary_lines;
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, ReadyTheme};

use crate::results::CheckResult;
use crate::scoring::RunVerdict;
use std::time::Duration;

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Display a message to the user.
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message. Shown in every mode.
    fn error(&mut self, msg: &str);

    /// Start a spinner for an operation.
    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle>;

    /// Show a header/banner.
    fn show_header(&mut self, title: &str);

    /// Announce a category (e.g., "[2/7] Security Headers") of `checks` checks.
    fn show_category(&mut self, name: &str, index: usize, total: usize, checks: usize);

    /// Show one recorded result.
    fn show_result(&mut self, result: &CheckResult);

    /// Close the category opened by [`show_category`](Self::show_category).
    fn finish_category(&mut self, name: &str, passed: usize, total: usize);

    /// Show the final score, tier, and per-category tallies.
    fn show_summary(&mut self, verdict: &RunVerdict, duration: Duration);

    /// Check if running in interactive mode.
    fn is_interactive(&self) -> bool;
}

/// Handle for controlling a spinner.
pub trait SpinnerHandle {
    /// Update the spinner message.
    fn set_message(&mut self, msg: &str);

    /// Mark the operation as successful.
    fn finish_success(&mut self, msg: &str);

    /// Mark the operation as failed.
    fn finish_error(&mut self, msg: &str);

    /// Mark as skipped.
    fn finish_skipped(&mut self, msg: &str);
}
