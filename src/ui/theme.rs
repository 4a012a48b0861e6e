//! Visual theme and styling.

use console::Style;

use crate::results::Outcome;
use crate::scoring::Tier;

/// Console styles.
#[derive(Debug, Clone)]
pub struct ReadyTheme {
    /// Style for success messages and PASS (green).
    pub success: Style,
    /// Style for warnings and PARTIAL (orange).
    pub warning: Style,
    /// Style for errors and FAIL (red bold).
    pub error: Style,
    /// Style for informational/running elements (magenta).
    pub info: Style,
    /// Style for dim/secondary text.
    pub dim: Style,
    /// Style for highlighted/important text (bold).
    pub highlight: Style,
    /// Style for category titles (bold).
    pub category: Style,
    /// Style for headers (magenta bold).
    pub header: Style,
    /// Style for counters such as `[2/7]` (dim).
    pub counter: Style,
    /// Style for durations (dim).
    pub duration: Style,
    /// Style for key labels in key-value displays (bold).
    pub key: Style,
}

impl Default for ReadyTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadyTheme {
    /// Create the colored theme.
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            info: Style::new().magenta(),
            dim: Style::new().dim(),
            highlight: Style::new().bold(),
            category: Style::new().bold(),
            header: Style::new().bold().magenta(),
            counter: Style::new().dim(),
            duration: Style::new().dim(),
            key: Style::new().bold(),
        }
    }

    /// Create a theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            info: Style::new(),
            dim: Style::new(),
            highlight: Style::new(),
            category: Style::new(),
            header: Style::new(),
            counter: Style::new(),
            duration: Style::new(),
            key: Style::new(),
        }
    }

    /// Style matching an outcome.
    pub fn outcome_style(&self, outcome: Outcome) -> &Style {
        match outcome {
            Outcome::Pass => &self.success,
            Outcome::Partial => &self.warning,
            Outcome::Fail => &self.error,
        }
    }

    /// Style matching a tier.
    pub fn tier_style(&self, tier: Tier) -> &Style {
        match tier {
            Tier::Ready => &self.success,
            Tier::NearReady | Tier::Development => &self.warning,
            Tier::NotReady => &self.error,
        }
    }

    /// Format a success message (icon + text in green).
    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    /// Format a warning message (icon + text in orange).
    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    /// Format an error message (icon + text in red bold).
    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    /// Format a skipped message (icon + text in dim).
    pub fn format_skipped(&self, msg: &str) -> String {
        format!("{}", self.dim.apply_to(format!("○ {}", msg)))
    }

    /// Format one check line: icon, name, and optional detail.
    pub fn format_result(&self, outcome: Outcome, name: &str, detail: Option<&str>) -> String {
        let head = self
            .outcome_style(outcome)
            .apply_to(format!("{} {}", outcome.icon(), name));
        match detail.filter(|d| !d.is_empty()) {
            Some(detail) => format!("{} {}", head, self.dim.apply_to(format!("· {}", detail))),
            None => head.to_string(),
        }
    }

    /// Format a category title with its position.
    pub fn format_category(&self, name: &str, index: usize, total: usize) -> String {
        format!(
            "{} {}",
            self.counter.apply_to(format!("[{}/{}]", index + 1, total)),
            self.category.apply_to(name)
        )
    }

    /// Format a header banner.
    pub fn format_header(&self, title: &str) -> String {
        format!(
            "{} {}",
            self.header.apply_to("◆"),
            self.highlight.apply_to(title)
        )
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // Check NO_COLOR env var (https://no-color.org/)
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    console::colors_enabled() && console::Term::stdout().is_term()
}
