//! Readiness tiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Readiness tier derived from the overall score.
///
/// Thresholds are inclusive lower bounds, evaluated in descending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    /// Overall score below 60.
    NotReady,
    /// Overall score of at least 60.
    Development,
    /// Overall score of at least 75.
    NearReady,
    /// Overall score of at least 90.
    Ready,
}

impl Tier {
    /// Tiers with their lower bound, highest first.
    pub const THRESHOLDS: [(f64, Tier); 3] = [
        (90.0, Tier::Ready),
        (75.0, Tier::NearReady),
        (60.0, Tier::Development),
    ];

    /// Classify an overall score.
    pub fn classify(score: f64) -> Self {
        Self::THRESHOLDS
            .iter()
            .find(|(min, _)| score >= *min)
            .map(|(_, tier)| *tier)
            .unwrap_or(Tier::NotReady)
    }

    /// Machine label used in reports.
    pub fn label(self) -> &'static str {
        match self {
            Tier::Ready => "ready",
            Tier::NearReady => "near-ready",
            Tier::Development => "development",
            Tier::NotReady => "not-ready",
        }
    }

    /// Banner shown in the console summary.
    pub fn headline(self) -> &'static str {
        match self {
            Tier::Ready => "READY FOR COMMERCIAL DEPLOYMENT",
            Tier::NearReady => "NEAR COMMERCIAL READY",
            Tier::Development => "DEVELOPMENT STAGE",
            Tier::NotReady => "NOT READY",
        }
    }

    /// Fixed recommendation for this tier.
    pub fn recommendation(self) -> &'static str {
        match self {
            Tier::Ready => "System is production-ready with minor optimizations needed.",
            Tier::NearReady => "System needs some improvements before commercial deployment.",
            Tier::Development => {
                "System requires significant work before commercial deployment."
            }
            Tier::NotReady => "System needs major development work before commercial deployment.",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_belong_to_higher_tier() {
        assert_eq!(Tier::classify(90.0), Tier::Ready);
        assert_eq!(Tier::classify(89.99), Tier::NearReady);
        assert_eq!(Tier::classify(75.0), Tier::NearReady);
        assert_eq!(Tier::classify(74.999), Tier::Development);
        assert_eq!(Tier::classify(60.0), Tier::Development);
        assert_eq!(Tier::classify(59.999), Tier::NotReady);
    }

    #[test]
    fn extremes() {
        assert_eq!(Tier::classify(100.0), Tier::Ready);
        assert_eq!(Tier::classify(0.0), Tier::NotReady);
    }

    #[test]
    fn tiers_are_ordered() {
        assert!(Tier::Ready > Tier::NearReady);
        assert!(Tier::NearReady > Tier::Development);
        assert!(Tier::Development > Tier::NotReady);
    }

    #[test]
    fn labels_and_serialization_agree() {
        for tier in [Tier::Ready, Tier::NearReady, Tier::Development, Tier::NotReady] {
            let json = serde_json::to_string(&tier).unwrap();
            assert_eq!(json, format!("\"{}\"", tier.label()));
        }
    }

    #[test]
    fn every_tier_has_a_recommendation() {
        for tier in [Tier::Ready, Tier::NearReady, Tier::Development, Tier::NotReady] {
            assert!(!tier.recommendation().is_empty());
        }
    }
}
