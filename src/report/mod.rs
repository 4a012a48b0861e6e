//! Report export.

pub mod json;

pub use json::{load_report, write_report, AssessmentReport, REPORT_FILE_NAME};
