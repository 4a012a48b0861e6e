//! Append-only, ordered log of check results.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::warn;

use super::outcome::{CheckResult, Outcome};

/// Category used when a check is recorded with an empty category name.
pub const DEFAULT_CATEGORY: &str = "general";

/// Results of one category, in recording order.
#[derive(Debug, Clone)]
pub struct CategoryResults<'a> {
    /// Category name.
    pub name: &'a str,
    /// Results recorded under this category.
    pub results: Vec<&'a CheckResult>,
}

/// Ordered, append-only record of every check executed in a run.
///
/// The recorder is owned by whoever drives the run and handed to check code
/// by reference. It is not internally synchronized: concurrent producers
/// hand their results back to a single owner which appends them.
///
/// # Example
///
/// ```
/// use readycheck::results::{Outcome, ResultRecorder};
///
/// let mut recorder = ResultRecorder::new();
/// recorder.record("auth", "login", Outcome::Pass, "token received");
/// recorder.record("crud", "create", Outcome::Fail, "status 500");
/// recorder.record("auth", "logout", Outcome::Partial, "");
///
/// let groups = recorder.by_category();
/// assert_eq!(groups[0].name, "auth");
/// assert_eq!(groups[0].results.len(), 2);
/// assert_eq!(groups[1].name, "crud");
/// ```
#[derive(Debug, Default)]
pub struct ResultRecorder {
    results: Vec<CheckResult>,
    categories: Vec<String>,
    names: HashSet<String>,
    last_observed: Option<DateTime<Utc>>,
}

impl ResultRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a category so it is reported even if no checks record into it.
    pub fn declare_category(&mut self, category: &str) {
        let category = normalize_category(category);
        if !self.categories.iter().any(|c| c == category) {
            self.categories.push(category.to_string());
        }
    }

    /// Append a result and return it.
    pub fn record(
        &mut self,
        category: &str,
        name: &str,
        outcome: Outcome,
        detail: impl Into<String>,
    ) -> &CheckResult {
        self.record_at(category, name, outcome, detail, Utc::now())
    }

    /// Append a result observed at `at`.
    ///
    /// Timestamps earlier than the previous result are clamped forward so
    /// `observed_at` never decreases within a run.
    pub fn record_at(
        &mut self,
        category: &str,
        name: &str,
        outcome: Outcome,
        detail: impl Into<String>,
        at: DateTime<Utc>,
    ) -> &CheckResult {
        if category.trim().is_empty() {
            warn!("Check '{}' recorded without a category", name);
        }
        self.declare_category(category);

        let observed_at = match self.last_observed {
            Some(last) if at < last => last,
            _ => at,
        };
        self.last_observed = Some(observed_at);

        let name = self.unique_name(name);
        self.results.push(CheckResult {
            category: normalize_category(category).to_string(),
            name,
            outcome,
            detail: detail.into(),
            observed_at,
        });

        &self.results[self.results.len() - 1]
    }

    /// All results in recording order.
    pub fn all(&self) -> &[CheckResult] {
        &self.results
    }

    /// Results grouped by category.
    ///
    /// Categories appear in first-seen (or first-declared) order; results
    /// keep their recording order within each category.
    pub fn by_category(&self) -> Vec<CategoryResults<'_>> {
        self.categories
            .iter()
            .map(|category| CategoryResults {
                name: category.as_str(),
                results: self
                    .results
                    .iter()
                    .filter(|r| &r.category == category)
                    .collect(),
            })
            .collect()
    }

    /// Number of recorded results.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Consume the recorder, returning the ordered results.
    pub fn into_results(self) -> Vec<CheckResult> {
        self.results
    }

    fn unique_name(&mut self, name: &str) -> String {
        if self.names.insert(name.to_string()) {
            return name.to_string();
        }

        let mut n = 2;
        loop {
            let candidate = format!("{} ({})", name, n);
            if self.names.insert(candidate.clone()) {
                warn!("Duplicate check name '{}' recorded as '{}'", name, candidate);
                return candidate;
            }
            n += 1;
        }
    }
}

/// Group an ordered slice of results by category, preserving first-seen order.
pub fn group_by_category(results: &[CheckResult]) -> Vec<CategoryResults<'_>> {
    let mut groups: Vec<CategoryResults<'_>> = Vec::new();
    for result in results {
        match groups.iter_mut().find(|g| g.name == result.category) {
            Some(group) => group.results.push(result),
            None => groups.push(CategoryResults {
                name: result.category.as_str(),
                results: vec![result],
            }),
        }
    }
    groups
}

fn normalize_category(category: &str) -> &str {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        DEFAULT_CATEGORY
    } else {
        trimmed
    }
}
