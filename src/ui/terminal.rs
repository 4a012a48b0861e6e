//! Interactive terminal UI.

use console::Term;
use std::io::Write;
use std::time::Duration;

use crate::results::{CheckResult, Outcome};
use crate::scoring::RunVerdict;

use super::progress::CategoryProgress;
use super::summary::summary_lines;
use super::{
    should_use_colors, NonInteractiveUI, OutputMode, ProgressSpinner, ReadyTheme, SpinnerHandle,
    UserInterface,
};

/// Interactive terminal UI implementation.
pub struct TerminalUI {
    term: Term,
    theme: ReadyTheme,
    mode: OutputMode,
    progress: Option<CategoryProgress>,
}

impl TerminalUI {
    /// Create a new terminal UI.
    pub fn new(mode: OutputMode) -> Self {
        let theme = if should_use_colors() {
            ReadyTheme::new()
        } else {
            ReadyTheme::plain()
        };

        Self {
            term: Term::stdout(),
            theme,
            mode,
            progress: None,
        }
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", msg).ok();
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_success(msg)).ok();
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_warning(msg)).ok();
        }
    }

    fn error(&mut self, msg: &str) {
        writeln!(self.term, "{}", self.theme.format_error(msg)).ok();
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_spinners() {
            Box::new(ProgressSpinner::new(message))
        } else {
            Box::new(ProgressSpinner::hidden())
        }
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "\n{}\n", self.theme.format_header(title)).ok();
        }
    }

    fn show_category(&mut self, name: &str, index: usize, total: usize, checks: usize) {
        if self.mode.shows_results() {
            writeln!(self.term, "{}", self.theme.format_category(name, index, total)).ok();
        } else {
            let label = self.theme.format_category(name, index, total);
            self.progress = Some(CategoryProgress::new(
                &label,
                checks,
                self.mode.shows_spinners(),
            ));
        }
    }

    fn show_result(&mut self, result: &CheckResult) {
        if let Some(progress) = self.progress.as_mut() {
            progress.advance(result.outcome);
        }
        if self.mode.shows_results() {
            let detail = if result.outcome != Outcome::Pass || self.mode.shows_pass_details() {
                Some(result.detail.as_str())
            } else {
                None
            };
            writeln!(
                self.term,
                "  {}",
                self.theme.format_result(result.outcome, &result.name, detail)
            )
            .ok();
        }
    }

    fn finish_category(&mut self, _name: &str, _passed: usize, _total: usize) {
        if let Some(progress) = self.progress.take() {
            progress.finish();
        } else if self.mode.shows_results() {
            writeln!(self.term).ok();
        }
    }

    fn show_summary(&mut self, verdict: &RunVerdict, duration: Duration) {
        if !self.mode.shows_status() {
            return;
        }
        writeln!(self.term).ok();
        for line in summary_lines(&self.theme, verdict, duration) {
            writeln!(self.term, "  {}", line).ok();
        }
        writeln!(self.term).ok();
    }

    fn is_interactive(&self) -> bool {
        self.term.is_term()
    }
}

/// Create the appropriate UI based on context.
pub fn create_ui(interactive: bool, mode: OutputMode) -> Box<dyn UserInterface> {
    if interactive && Term::stdout().is_term() {
        Box::new(TerminalUI::new(mode))
    } else {
        Box::new(NonInteractiveUI::new(mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_ui_output_mode() {
        let ui = TerminalUI::new(OutputMode::Quiet);
        assert_eq!(ui.output_mode(), OutputMode::Quiet);
    }

    #[test]
    fn create_ui_non_interactive() {
        let ui = create_ui(false, OutputMode::Normal);
        assert!(!ui.is_interactive());
    }

    #[test]
    fn create_ui_respects_mode() {
        let ui = create_ui(false, OutputMode::Silent);
        assert_eq!(ui.output_mode(), OutputMode::Silent);
    }
}
