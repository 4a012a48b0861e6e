//! Check outcomes and the result recorder.

pub mod outcome;
pub mod recorder;

pub use outcome::{CheckResult, Outcome};
pub use recorder::{group_by_category, CategoryResults, ResultRecorder, DEFAULT_CATEGORY};
