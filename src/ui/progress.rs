//! Category progress display.

use std::time::{Duration, Instant};

use crate::results::Outcome;

use super::{ProgressSpinner, SpinnerHandle};

/// Spinner tracking the checks of one category.
///
/// Used in quiet mode, where individual results are not printed.
pub struct CategoryProgress {
    label: String,
    checks: usize,
    done: usize,
    passed: usize,
    spinner: Option<Box<dyn SpinnerHandle>>,
    start_time: Instant,
}

impl CategoryProgress {
    /// Create a progress display; `show_spinner` false keeps it invisible.
    pub fn new(label: &str, checks: usize, show_spinner: bool) -> Self {
        let spinner = if show_spinner {
            Some(Box::new(ProgressSpinner::new(&format!("{} (0/{})", label, checks)))
                as Box<dyn SpinnerHandle>)
        } else {
            None
        };

        Self {
            label: label.to_string(),
            checks,
            done: 0,
            passed: 0,
            spinner,
            start_time: Instant::now(),
        }
    }

    /// Count a finished check.
    pub fn advance(&mut self, outcome: Outcome) {
        self.done += 1;
        if outcome == Outcome::Pass {
            self.passed += 1;
        }
        let msg = format!("{} ({}/{})", self.label, self.done, self.checks);
        if let Some(spinner) = &mut self.spinner {
            spinner.set_message(&msg);
        }
    }

    /// Finish with a line summarizing passes.
    ///
    /// Returns the message that was shown.
    pub fn finish(mut self) -> String {
        let msg = format!(
            "{} {}/{} passed ({})",
            self.label,
            self.passed,
            self.done,
            format_duration(self.elapsed())
        );
        if let Some(mut spinner) = self.spinner.take() {
            if self.done == 0 {
                spinner.finish_skipped(&msg);
            } else if self.passed == self.done {
                spinner.finish_success(&msg);
            } else {
                spinner.finish_error(&msg);
            }
        }
        msg
    }

    /// Time since the category started.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Format a duration for display.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 1.0 {
        format!("{}ms", d.as_millis())
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let mins = secs / 60.0;
        format!("{:.1}m", mins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_duration_milliseconds() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
    }

    #[test]
    fn format_duration_seconds() {
        assert_eq!(format_duration(Duration::from_secs_f64(5.5)), "5.5s");
    }

    #[test]
    fn format_duration_minutes() {
        assert_eq!(format_duration(Duration::from_secs(90)), "1.5m");
    }

    #[test]
    fn format_duration_zero() {
        assert_eq!(format_duration(Duration::ZERO), "0ms");
    }

    #[test]
    fn progress_counts_passes_without_spinner() {
        let mut progress = CategoryProgress::new("Security Headers", 3, false);
        progress.advance(Outcome::Pass);
        progress.advance(Outcome::Partial);
        progress.advance(Outcome::Pass);

        let msg = progress.finish();
        assert!(msg.starts_with("Security Headers 2/3 passed"), "{}", msg);
    }
}
