//! Scoring engine: category tallies, overall score, and readiness tier.

pub mod engine;
pub mod tier;

pub use engine::{score, score_grouped, CategoryTally, RunVerdict};
pub use tier::Tier;
