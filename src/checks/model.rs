//! Checks and the categories that group them.

use crate::probe::ProbeOutcome;
use crate::results::Outcome;
use std::fmt;

use super::context::CheckContext;

/// What a check concluded.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckVerdict {
    pub outcome: Outcome,
    pub detail: String,
}

impl CheckVerdict {
    pub fn new(outcome: Outcome, detail: impl Into<String>) -> Self {
        Self {
            outcome,
            detail: detail.into(),
        }
    }

    pub fn pass(detail: impl Into<String>) -> Self {
        Self::new(Outcome::Pass, detail)
    }

    pub fn partial(detail: impl Into<String>) -> Self {
        Self::new(Outcome::Partial, detail)
    }

    pub fn fail(detail: impl Into<String>) -> Self {
        Self::new(Outcome::Fail, detail)
    }

    /// PASS or FAIL depending on `passed`.
    pub fn from_bool(passed: bool, detail: impl Into<String>) -> Self {
        Self::new(Outcome::from_bool(passed), detail)
    }
}

impl From<&ProbeOutcome> for CheckVerdict {
    fn from(outcome: &ProbeOutcome) -> Self {
        Self::new(outcome.base_outcome(), outcome.detail())
    }
}

/// Signature of a check body.
///
/// An `Err` is recorded as FAIL with the error text as detail.
pub type CheckFn = dyn Fn(&CheckContext) -> anyhow::Result<CheckVerdict> + Send + Sync;

/// A named unit of assessment producing exactly one result.
pub struct Check {
    name: String,
    body: Box<CheckFn>,
}

impl Check {
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&CheckContext) -> anyhow::Result<CheckVerdict> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            body: Box::new(body),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Execute the body. Panics are not caught here.
    pub fn run(&self, ctx: &CheckContext) -> anyhow::Result<CheckVerdict> {
        (self.body)(ctx)
    }
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Check").field("name", &self.name).finish()
    }
}

/// An ordered group of checks scored together.
#[derive(Debug)]
pub struct Category {
    pub name: String,
    pub checks: Vec<Check>,
    /// Checks may run concurrently; results are still recorded in order.
    pub parallel: bool,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            checks: Vec::new(),
            parallel: false,
        }
    }

    /// Append a check.
    pub fn check<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&CheckContext) -> anyhow::Result<CheckVerdict> + Send + Sync + 'static,
    {
        self.checks.push(Check::new(name, body));
        self
    }

    /// Allow the checks to run concurrently.
    pub fn parallel(mut self) -> Self {
        self.parallel = true;
        self
    }

    /// Case-insensitive name comparison, also accepting kebab-case
    /// (`security-headers` matches `Security Headers`).
    pub fn matches(&self, name: &str) -> bool {
        slug(&self.name) == slug(name)
    }

    /// Kebab-case form of the name.
    pub fn slug(&self) -> String {
        slug(&self.name)
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

fn slug(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Keep only the categories selected by `only` and not named by `skip`.
///
/// An empty `only` selects everything. Returns the names in `only` and
/// `skip` that matched no category.
pub fn filter_categories(
    categories: Vec<Category>,
    only: &[String],
    skip: &[String],
) -> (Vec<Category>, Vec<String>) {
    let unknown = only
        .iter()
        .chain(skip)
        .filter(|name| !categories.iter().any(|c| c.matches(name)))
        .cloned()
        .collect();

    let kept = categories
        .into_iter()
        .filter(|c| only.is_empty() || only.iter().any(|name| c.matches(name)))
        .filter(|c| !skip.iter().any(|name| c.matches(name)))
        .collect();

    (kept, unknown)
}
