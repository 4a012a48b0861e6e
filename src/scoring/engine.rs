//! Weighted scoring of recorded results.

use serde::{Deserialize, Serialize, Serializer};

use crate::results::{group_by_category, CategoryResults, CheckResult, Outcome};

use super::tier::Tier;

/// Aggregate for one category. Always derived from the results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTally {
    /// Category name.
    pub category: String,
    /// Number of results in the category.
    pub total: usize,
    /// Number of PASS results.
    pub passed: usize,
    /// Number of PARTIAL results.
    pub partial: usize,
    /// Number of FAIL results.
    pub failed: usize,
    /// Sum of outcome weights.
    pub weighted_sum: f64,
    /// `100 * weighted_sum / total`, or 0 for an empty category.
    #[serde(serialize_with = "one_decimal")]
    pub percentage: f64,
}

impl CategoryTally {
    /// Whether no checks ran in this category.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Terminal verdict for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunVerdict {
    /// Number of recorded results.
    pub total_checks: usize,
    /// Number of PASS results.
    pub passed: usize,
    /// Number of PARTIAL results.
    pub partial: usize,
    /// Number of FAIL results.
    pub failed: usize,
    /// Sum of outcome weights across all results.
    pub weighted_sum: f64,
    /// Overall weighted score, 0 to 100.
    #[serde(serialize_with = "one_decimal")]
    pub overall_score: f64,
    /// Readiness tier (classified on the exact score).
    pub tier: Tier,
    /// Recommendation for the tier.
    pub recommendation: String,
    /// Per-category tallies in first-seen order.
    pub per_category: Vec<CategoryTally>,
}

impl RunVerdict {
    /// Overall score rounded to one decimal, for presentation.
    pub fn display_score(&self) -> f64 {
        round_one_decimal(self.overall_score)
    }

    /// Whether every recorded check passed and at least one ran.
    pub fn is_perfect(&self) -> bool {
        self.total_checks > 0 && self.failed == 0 && self.partial == 0
    }

    /// Process exit code for this verdict.
    ///
    /// Any FAIL or PARTIAL (or an empty run) yields a non-zero code, even
    /// when the tier is "ready".
    pub fn exit_code(&self) -> i32 {
        if self.is_perfect() {
            0
        } else {
            1
        }
    }

    /// Look up the tally for a category.
    pub fn category(&self, name: &str) -> Option<&CategoryTally> {
        self.per_category.iter().find(|t| t.category == name)
    }
}

/// Score an ordered sequence of results.
///
/// Pure function of its input: the same sequence always yields an identical
/// verdict.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use readycheck::results::{CheckResult, Outcome};
/// use readycheck::scoring::{score, Tier};
///
/// let make = |category: &str, name: &str, outcome| CheckResult {
///     category: category.to_string(),
///     name: name.to_string(),
///     outcome,
///     detail: String::new(),
///     observed_at: Utc::now(),
/// };
/// let results = vec![
///     make("auth", "login", Outcome::Pass),
///     make("auth", "bad login", Outcome::Partial),
///     make("crud", "create", Outcome::Fail),
/// ];
///
/// let verdict = score(&results);
/// assert_eq!(verdict.overall_score, 50.0);
/// assert_eq!(verdict.tier, Tier::NotReady);
/// ```
pub fn score(results: &[CheckResult]) -> RunVerdict {
    score_grouped(&group_by_category(results))
}

/// Score results that are already grouped by category.
///
/// Groups with no results are reported as 0% on 0/0 and contribute nothing
/// to the overall score.
pub fn score_grouped(groups: &[CategoryResults<'_>]) -> RunVerdict {
    let per_category: Vec<CategoryTally> = groups.iter().map(tally).collect();

    let total_checks = per_category.iter().map(|t| t.total).sum();
    let passed = per_category.iter().map(|t| t.passed).sum();
    let partial = per_category.iter().map(|t| t.partial).sum();
    let failed = per_category.iter().map(|t| t.failed).sum();
    let weighted_sum: f64 = groups
        .iter()
        .flat_map(|g| g.results.iter())
        .map(|r| r.outcome.weight())
        .sum();

    let overall_score = percentage(weighted_sum, total_checks);
    let tier = Tier::classify(overall_score);

    RunVerdict {
        total_checks,
        passed,
        partial,
        failed,
        weighted_sum,
        overall_score,
        tier,
        recommendation: tier.recommendation().to_string(),
        per_category,
    }
}

fn tally(group: &CategoryResults<'_>) -> CategoryTally {
    let count = |outcome: Outcome| group.results.iter().filter(|r| r.outcome == outcome).count();
    let weighted_sum: f64 = group.results.iter().map(|r| r.outcome.weight()).sum();
    let total = group.results.len();

    CategoryTally {
        category: group.name.to_string(),
        total,
        passed: count(Outcome::Pass),
        partial: count(Outcome::Partial),
        failed: count(Outcome::Fail),
        weighted_sum,
        percentage: percentage(weighted_sum, total),
    }
}

// Multiply before dividing so half-weight sums stay exact.
fn percentage(weighted_sum: f64, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * weighted_sum / total as f64
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn one_decimal<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_one_decimal(*value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::ResultRecorder;

    fn recorder_with(entries: &[(&str, Outcome)]) -> ResultRecorder {
        let mut recorder = ResultRecorder::new();
        for (i, (category, outcome)) in entries.iter().enumerate() {
            recorder.record(category, &format!("check {}", i), *outcome, "");
        }
        recorder
    }

    #[test]
    fn all_pass_scores_100() {
        let recorder = recorder_with(&[("a", Outcome::Pass), ("a", Outcome::Pass)]);
        let verdict = score(recorder.all());
        assert_eq!(verdict.category("a").unwrap().percentage, 100.0);
        assert_eq!(verdict.overall_score, 100.0);
        assert_eq!(verdict.tier, Tier::Ready);
        assert_eq!(verdict.exit_code(), 0);
    }

    #[test]
    fn all_fail_scores_0() {
        let recorder = recorder_with(&[("a", Outcome::Fail), ("a", Outcome::Fail)]);
        let verdict = score(recorder.all());
        assert_eq!(verdict.category("a").unwrap().percentage, 0.0);
        assert_eq!(verdict.tier, Tier::NotReady);
    }

    #[test]
    fn pass_partial_fail_scores_50() {
        let recorder = recorder_with(&[
            ("a", Outcome::Pass),
            ("a", Outcome::Partial),
            ("a", Outcome::Fail),
        ]);
        let verdict = score(recorder.all());
        let tally = verdict.category("a").unwrap();
        assert_eq!(tally.weighted_sum, 1.5);
        assert_eq!(tally.percentage, 50.0);
        assert_eq!((tally.passed, tally.partial, tally.failed), (1, 1, 1));
    }

    #[test]
    fn overall_is_weighted_by_check_count_not_category_average() {
        // auth: 1/2 = 50%, crud: 3/3 = 100%. Category mean would be 75.
        let recorder = recorder_with(&[
            ("auth", Outcome::Pass),
            ("auth", Outcome::Fail),
            ("crud", Outcome::Pass),
            ("crud", Outcome::Pass),
            ("crud", Outcome::Pass),
        ]);
        let verdict = score(recorder.all());
        assert_eq!(verdict.overall_score, 80.0);
        assert_eq!(verdict.tier, Tier::NearReady);
    }

    #[test]
    fn two_category_scenario_lands_in_development() {
        let recorder = recorder_with(&[
            ("auth", Outcome::Pass),
            ("auth", Outcome::Fail),
            ("crud", Outcome::Pass),
            ("crud", Outcome::Pass),
            ("crud", Outcome::Partial),
        ]);
        let verdict = score(recorder.all());
        assert_eq!(verdict.total_checks, 5);
        assert_eq!(verdict.weighted_sum, 3.5);
        assert_eq!(verdict.overall_score, 70.0);
        assert_eq!(verdict.tier, Tier::Development);
        assert_ne!(verdict.exit_code(), 0);
    }

    #[test]
    fn empty_category_reports_zero_without_distorting_overall() {
        let mut recorder = ResultRecorder::new();
        recorder.declare_category("suites");
        recorder.record("auth", "login", Outcome::Pass, "");

        let verdict = score_grouped(&recorder.by_category());
        let suites = verdict.category("suites").unwrap();
        assert!(suites.is_empty());
        assert_eq!(suites.percentage, 0.0);
        assert_eq!(verdict.overall_score, 100.0);
    }

    #[test]
    fn empty_run_is_not_ready_and_non_zero_exit() {
        let verdict = score(&[]);
        assert_eq!(verdict.total_checks, 0);
        assert_eq!(verdict.overall_score, 0.0);
        assert_eq!(verdict.tier, Tier::NotReady);
        assert_ne!(verdict.exit_code(), 0);
    }

    #[test]
    fn partial_alone_prevents_zero_exit() {
        let mut entries = vec![("a", Outcome::Pass); 19];
        entries.push(("a", Outcome::Partial));
        let recorder = recorder_with(&entries);
        let verdict = score(recorder.all());
        assert_eq!(verdict.overall_score, 97.5);
        assert_eq!(verdict.tier, Tier::Ready);
        assert_eq!(verdict.exit_code(), 1);
    }

    #[test]
    fn scoring_is_deterministic() {
        let recorder = recorder_with(&[
            ("x", Outcome::Partial),
            ("y", Outcome::Pass),
            ("x", Outcome::Fail),
        ]);
        let first = score(recorder.all());
        for _ in 0..5 {
            assert_eq!(score(recorder.all()), first);
        }
    }

    #[test]
    fn serialized_scores_use_one_decimal() {
        let recorder = recorder_with(&[
            ("a", Outcome::Pass),
            ("a", Outcome::Pass),
            ("a", Outcome::Fail),
        ]);
        let verdict = score(recorder.all());
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["overall_score"], 66.7);
        assert_eq!(json["tier"], "development");
        assert_eq!(verdict.display_score(), 66.7);
    }
}
