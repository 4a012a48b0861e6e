//! Non-interactive UI for CI/headless environments.

use std::time::Duration;

use crate::results::{CheckResult, Outcome};
use crate::scoring::RunVerdict;

use super::summary::summary_lines;
use super::theme::ReadyTheme;
use super::{OutputMode, SpinnerHandle, UserInterface};

/// UI implementation for non-interactive mode.
///
/// Writes plain lines with no spinners or colors, so CI logs stay readable.
pub struct NonInteractiveUI {
    mode: OutputMode,
    theme: ReadyTheme,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI.
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            theme: ReadyTheme::plain(),
        }
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", self.theme.format_success(msg));
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("{}", self.theme.format_warning(msg));
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("{}", self.theme.format_error(msg));
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_status() {
            println!("{}", message);
        }
        Box::new(LineSpinner {
            quiet: !self.mode.shows_status(),
            theme: ReadyTheme::plain(),
        })
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            println!("\n{}\n", self.theme.format_header(title));
        }
    }

    fn show_category(&mut self, name: &str, index: usize, total: usize, _checks: usize) {
        if self.mode.shows_results() {
            println!("{}", self.theme.format_category(name, index, total));
        }
    }

    fn show_result(&mut self, result: &CheckResult) {
        if !self.mode.shows_results() {
            return;
        }
        let detail = if result.outcome != Outcome::Pass || self.mode.shows_pass_details() {
            Some(result.detail.as_str())
        } else {
            None
        };
        println!(
            "  {}",
            self.theme.format_result(result.outcome, &result.name, detail)
        );
    }

    fn finish_category(&mut self, name: &str, passed: usize, total: usize) {
        if self.mode.shows_results() {
            println!();
        } else if self.mode.shows_status() {
            println!("{} {}/{} passed", name, passed, total);
        }
    }

    fn show_summary(&mut self, verdict: &RunVerdict, duration: Duration) {
        if !self.mode.shows_status() {
            return;
        }
        println!();
        for line in summary_lines(&self.theme, verdict, duration) {
            println!("  {}", line);
        }
        println!();
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Spinner stand-in that prints only the final line.
struct LineSpinner {
    quiet: bool,
    theme: ReadyTheme,
}

impl SpinnerHandle for LineSpinner {
    fn set_message(&mut self, _msg: &str) {}

    fn finish_success(&mut self, msg: &str) {
        if !self.quiet {
            println!("{}", self.theme.format_success(msg));
        }
    }

    fn finish_error(&mut self, msg: &str) {
        eprintln!("{}", self.theme.format_error(msg));
    }

    fn finish_skipped(&mut self, msg: &str) {
        if !self.quiet {
            println!("{}", self.theme.format_skipped(msg));
        }
    }
}
