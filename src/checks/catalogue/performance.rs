//! Response latency grading.

use crate::checks::{Category, CheckVerdict};
use crate::config::HarnessConfig;
use crate::probe::{ProbeOutcome, ProbeRequest};
use crate::results::Outcome;
use std::time::Duration;

/// PASS/PARTIAL upper bounds for API calls.
pub const API_LATENCY: LatencyBudget = LatencyBudget {
    pass_under: Duration::from_secs(1),
    partial_under: Duration::from_secs(2),
};

/// PASS/PARTIAL upper bounds for the root document.
pub const PAGE_LATENCY: LatencyBudget = LatencyBudget {
    pass_under: Duration::from_secs(3),
    partial_under: Duration::from_secs(5),
};

const PAGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Exclusive latency thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyBudget {
    pub pass_under: Duration,
    pub partial_under: Duration,
}

impl LatencyBudget {
    pub fn grade(&self, elapsed: Duration) -> Outcome {
        if elapsed < self.pass_under {
            Outcome::Pass
        } else if elapsed < self.partial_under {
            Outcome::Partial
        } else {
            Outcome::Fail
        }
    }
}

pub fn category(config: &HarnessConfig) -> Category {
    let mut paths = vec![config.endpoints.health.clone()];
    paths.extend(config.resources.iter().map(|r| r.path.clone()));

    let category = Category::new("Performance").check("Page load time", |ctx| {
        timed(ctx.probe(ProbeRequest::get("/").timeout(PAGE_TIMEOUT)), PAGE_LATENCY)
    });

    paths.into_iter().fold(category, |category, path| {
        category.check(format!("API response time {}", path), move |ctx| {
            timed(ctx.probe_authed(ProbeRequest::get(path.as_str())), API_LATENCY)
        })
    })
}

fn timed(outcome: ProbeOutcome, budget: LatencyBudget) -> anyhow::Result<CheckVerdict> {
    if outcome.response().is_none() {
        anyhow::bail!(outcome.detail());
    }
    let elapsed = outcome.elapsed();
    Ok(CheckVerdict::new(
        budget.grade(elapsed),
        format!(
            "{:.2}s (pass < {}s, partial < {}s)",
            elapsed.as_secs_f64(),
            budget.pass_under.as_secs(),
            budget.partial_under.as_secs()
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_thresholds_are_exclusive() {
        assert_eq!(API_LATENCY.grade(Duration::from_millis(999)), Outcome::Pass);
        assert_eq!(API_LATENCY.grade(Duration::from_secs(1)), Outcome::Partial);
        assert_eq!(API_LATENCY.grade(Duration::from_millis(1999)), Outcome::Partial);
        assert_eq!(API_LATENCY.grade(Duration::from_secs(2)), Outcome::Fail);
    }

    #[test]
    fn page_thresholds() {
        assert_eq!(PAGE_LATENCY.grade(Duration::from_millis(2500)), Outcome::Pass);
        assert_eq!(PAGE_LATENCY.grade(Duration::from_secs(4)), Outcome::Partial);
        assert_eq!(PAGE_LATENCY.grade(Duration::from_secs(6)), Outcome::Fail);
    }

    #[test]
    fn one_check_per_path() {
        let category = category(&HarnessConfig::default());
        let names: Vec<&str> = category.checks.iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            vec![
                "Page load time",
                "API response time /api/health",
                "API response time /api/users",
                "API response time /api/customers",
            ]
        );
    }
}
