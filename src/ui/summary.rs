//! Final score rendering shared by the console UIs.

use std::time::Duration;

use crate::scoring::RunVerdict;

use super::progress::format_duration;
use super::theme::ReadyTheme;

/// Lines of the end-of-run summary.
///
/// ```text
/// Infrastructure        2/3   66.7%
/// Security Headers      6/6  100.0%
///
/// Overall score 87.5% · near-ready · 24 checks in 3.4s
/// NEAR COMMERCIAL READY
/// System needs some improvements before commercial deployment.
/// ```
pub fn summary_lines(theme: &ReadyTheme, verdict: &RunVerdict, duration: Duration) -> Vec<String> {
    let width = verdict
        .per_category
        .iter()
        .map(|t| t.category.chars().count())
        .max()
        .unwrap_or(0);

    let mut lines: Vec<String> = verdict
        .per_category
        .iter()
        .map(|tally| {
            let counts = if tally.partial > 0 {
                format!("{}/{} ({} partial)", tally.passed, tally.total, tally.partial)
            } else {
                format!("{}/{}", tally.passed, tally.total)
            };
            format!(
                "{:<width$}  {:>5}  {}",
                theme.key.apply_to(&tally.category),
                format!("{:.1}%", tally.percentage),
                theme.dim.apply_to(counts),
                width = width
            )
        })
        .collect();

    let style = theme.tier_style(verdict.tier);
    lines.push(String::new());
    lines.push(format!(
        "Overall score {} {} {} {}",
        style.apply_to(format!("{:.1}%", verdict.display_score())),
        theme.dim.apply_to("·"),
        style.apply_to(verdict.tier.label()),
        theme.duration.apply_to(format!(
            "· {} checks in {}",
            verdict.total_checks,
            format_duration(duration)
        )),
    ));
    lines.push(style.apply_to(verdict.tier.headline()).to_string());
    lines.push(verdict.recommendation.clone());
    lines
}
