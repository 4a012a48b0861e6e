//! Mock UI for testing.

use std::time::Duration;

use crate::results::CheckResult;
use crate::scoring::RunVerdict;

use super::{OutputMode, SpinnerHandle, UserInterface};

/// Mock UI that captures all output for testing.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    interactive: bool,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    headers: Vec<String>,
    spinners: Vec<String>,
    categories: Vec<(String, usize, usize)>,
    finished_categories: Vec<(String, usize, usize)>,
    results: Vec<CheckResult>,
    summaries: Vec<(f64, String)>,
}

impl MockUI {
    /// Create a new mock UI.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock UI with a specific output mode.
    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Set whether the mock reports itself as interactive.
    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    /// Get all messages.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Get all success messages.
    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    /// Get all warnings.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Get all errors.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Get all headers.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Get all spinner messages.
    pub fn spinners(&self) -> &[String] {
        &self.spinners
    }

    /// Announced categories as (name, index, total).
    pub fn categories(&self) -> &[(String, usize, usize)] {
        &self.categories
    }

    /// Closed categories as (name, passed, total).
    pub fn finished_categories(&self) -> &[(String, usize, usize)] {
        &self.finished_categories
    }

    /// Results shown, in order.
    pub fn results(&self) -> &[CheckResult] {
        &self.results
    }

    /// Summaries shown as (score, tier label).
    pub fn summaries(&self) -> &[(f64, String)] {
        &self.summaries
    }

    /// Check if a message was shown.
    pub fn has_message(&self, msg: &str) -> bool {
        self.messages.iter().any(|m| m.contains(msg))
    }

    /// Check if a success message was shown.
    pub fn has_success(&self, msg: &str) -> bool {
        self.successes.iter().any(|m| m.contains(msg))
    }

    /// Check if a warning was shown.
    pub fn has_warning(&self, msg: &str) -> bool {
        self.warnings.iter().any(|m| m.contains(msg))
    }

    /// Check if an error was shown.
    pub fn has_error(&self, msg: &str) -> bool {
        self.errors.iter().any(|m| m.contains(msg))
    }

    /// Clear all captured output.
    pub fn clear(&mut self) {
        let mode = self.mode;
        let interactive = self.interactive;
        *self = Self {
            mode,
            interactive,
            ..Self::default()
        };
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        self.spinners.push(message.to_string());
        Box::new(MockSpinner::new())
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn show_category(&mut self, name: &str, index: usize, total: usize, _checks: usize) {
        self.categories.push((name.to_string(), index, total));
    }

    fn show_result(&mut self, result: &CheckResult) {
        self.results.push(result.clone());
    }

    fn finish_category(&mut self, name: &str, passed: usize, total: usize) {
        self.finished_categories
            .push((name.to_string(), passed, total));
    }

    fn show_summary(&mut self, verdict: &RunVerdict, _duration: Duration) {
        self.summaries
            .push((verdict.display_score(), verdict.tier.label().to_string()));
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}

/// Mock spinner that captures finish messages.
#[derive(Debug, Default)]
pub struct MockSpinner {
    messages: Vec<String>,
    finish_message: Option<String>,
    status: Option<SpinnerStatus>,
}

/// Status of a mock spinner when finished.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpinnerStatus {
    /// Finished successfully.
    Success,
    /// Finished with error.
    Error,
    /// Finished as skipped.
    Skipped,
}

impl MockSpinner {
    /// Create a new mock spinner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all messages set during spinning.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Get the final finish message.
    pub fn finish_message(&self) -> Option<&str> {
        self.finish_message.as_deref()
    }

    /// Get the final status.
    pub fn status(&self) -> Option<SpinnerStatus> {
        self.status
    }
}

impl SpinnerHandle for MockSpinner {
    fn set_message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn finish_success(&mut self, msg: &str) {
        self.finish_message = Some(msg.to_string());
        self.status = Some(SpinnerStatus::Success);
    }

    fn finish_error(&mut self, msg: &str) {
        self.finish_message = Some(msg.to_string());
        self.status = Some(SpinnerStatus::Error);
    }

    fn finish_skipped(&mut self, msg: &str) {
        self.finish_message = Some(msg.to_string());
        self.status = Some(SpinnerStatus::Skipped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::{Outcome, ResultRecorder};
    use crate::scoring::score;

    #[test]
    fn mock_ui_captures_messages() {
        let mut ui = MockUI::new();

        ui.message("Hello");
        ui.success("Done");
        ui.warning("Careful");
        ui.error("Failed");

        assert_eq!(ui.messages(), &["Hello"]);
        assert_eq!(ui.successes(), &["Done"]);
        assert_eq!(ui.warnings(), &["Careful"]);
        assert_eq!(ui.errors(), &["Failed"]);
    }

    #[test]
    fn mock_ui_captures_spinners() {
        let mut ui = MockUI::new();
        let mut spinner = ui.start_spinner("Starting server");
        spinner.finish_success("Ready");

        assert_eq!(ui.spinners(), &["Starting server"]);
    }

    #[test]
    fn mock_ui_captures_categories_and_results() {
        let mut recorder = ResultRecorder::new();
        let result = recorder
            .record("Infrastructure", "API health", Outcome::Pass, "")
            .clone();

        let mut ui = MockUI::new();
        ui.show_category("Infrastructure", 1, 7, 3);
        ui.show_result(&result);
        ui.finish_category("Infrastructure", 1, 1);

        assert_eq!(ui.categories(), &[("Infrastructure".to_string(), 1, 7)]);
        assert_eq!(ui.results().len(), 1);
        assert_eq!(
            ui.finished_categories(),
            &[("Infrastructure".to_string(), 1, 1)]
        );
    }

    #[test]
    fn mock_ui_captures_summary() {
        let mut recorder = ResultRecorder::new();
        recorder.record("Infrastructure", "a", Outcome::Pass, "");
        let verdict = score(recorder.all());

        let mut ui = MockUI::new();
        ui.show_summary(&verdict, Duration::from_secs(1));

        assert_eq!(ui.summaries(), &[(100.0, "ready".to_string())]);
    }

    #[test]
    fn mock_ui_clear_resets() {
        let mut ui = MockUI::with_mode(OutputMode::Quiet);
        ui.message("Test");
        ui.show_header("Header");
        ui.clear();

        assert!(ui.messages().is_empty());
        assert!(ui.headers().is_empty());
        assert_eq!(ui.output_mode(), OutputMode::Quiet);
    }

    #[test]
    fn mock_ui_has_helpers() {
        let mut ui = MockUI::new();
        ui.message("Checking target");
        ui.error("Server exited");
        ui.warning("Unknown category");
        ui.success("Report written");

        assert!(ui.has_message("target"));
        assert!(ui.has_error("exited"));
        assert!(ui.has_warning("Unknown"));
        assert!(ui.has_success("Report"));
    }

    #[test]
    fn mock_spinner_records_status() {
        let mut spinner = MockSpinner::new();
        spinner.set_message("Waiting");
        spinner.finish_error("Timed out");

        assert_eq!(spinner.messages(), &["Waiting"]);
        assert_eq!(spinner.finish_message(), Some("Timed out"));
        assert_eq!(spinner.status(), Some(SpinnerStatus::Error));
    }
}
