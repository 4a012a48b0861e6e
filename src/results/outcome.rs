//! Check outcomes and individual check results.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    /// The check met its expectation.
    Pass,
    /// The check was inconclusive or met the expectation only in part.
    Partial,
    /// The check did not meet its expectation.
    Fail,
}

impl Outcome {
    /// Weight used by the scoring engine.
    pub fn weight(self) -> f64 {
        match self {
            Outcome::Pass => 1.0,
            Outcome::Partial => 0.5,
            Outcome::Fail => 0.0,
        }
    }

    /// Map a boolean signal to PASS/FAIL.
    pub fn from_bool(passed: bool) -> Self {
        if passed {
            Outcome::Pass
        } else {
            Outcome::Fail
        }
    }

    /// Status icon for console output.
    pub fn icon(self) -> &'static str {
        match self {
            Outcome::Pass => "✓",
            Outcome::Partial => "◐",
            Outcome::Fail => "✗",
        }
    }

    /// Upper-case label, as used in reports.
    pub fn label(self) -> &'static str {
        match self {
            Outcome::Pass => "PASS",
            Outcome::Partial => "PARTIAL",
            Outcome::Fail => "FAIL",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PASS" => Ok(Outcome::Pass),
            "PARTIAL" => Ok(Outcome::Partial),
            "FAIL" => Ok(Outcome::Fail),
            _ => Err(format!("unknown outcome: {}", s)),
        }
    }
}

/// One recorded observation.
///
/// Created exactly once per check execution by the [`ResultRecorder`] and
/// never mutated afterwards.
///
/// [`ResultRecorder`]: super::ResultRecorder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Category the check belongs to.
    pub category: String,

    /// Human-readable name, unique within a run.
    pub name: String,

    /// Outcome of the check.
    pub outcome: Outcome,

    /// Free-text detail (may be empty).
    #[serde(default)]
    pub detail: String,

    /// When the result was recorded. Non-decreasing within a run.
    pub observed_at: DateTime<Utc>,
}

impl CheckResult {
    /// Whether the check passed outright.
    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Pass
    }
}
