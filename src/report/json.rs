//! The `assessment-report.json` export.

use crate::error::{ReadyCheckError, Result};
use crate::results::CheckResult;
use crate::runner::RunOutcome;
use crate::scoring::RunVerdict;
use crate::supervisor::SupervisorSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name of the report inside the report directory.
pub const REPORT_FILE_NAME: &str = "assessment-report.json";

/// Snapshot of a finished run.
///
/// `verdict` is embedded for readers; [`load_report`] ignores it and callers
/// rescore from `results`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentReport {
    pub generated_at: DateTime<Utc>,
    pub tool_version: String,
    pub target: String,
    pub tenant: String,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verdict: Option<RunVerdict>,
    pub results: Vec<CheckResult>,
    #[serde(default)]
    pub interrupted: Option<String>,
    #[serde(default)]
    pub skipped: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supervisor: Option<SupervisorSummary>,
}

impl AssessmentReport {
    /// Build a report from a run.
    pub fn from_run(outcome: &RunOutcome, target: &str, tenant: &str) -> Self {
        Self {
            generated_at: Utc::now(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            target: target.to_string(),
            tenant: tenant.to_string(),
            duration_ms: outcome.duration.as_millis() as u64,
            verdict: Some(outcome.verdict.clone()),
            results: outcome.recorder.all().to_vec(),
            interrupted: outcome.interrupted.clone(),
            skipped: outcome.skipped,
            supervisor: outcome.server.clone(),
        }
    }

    /// Pretty JSON text.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ReadyCheckError::Other(e.into()))
    }
}

/// Write `report` to `<dir>/assessment-report.json`, creating `dir`.
pub fn write_report(dir: &Path, report: &AssessmentReport) -> Result<PathBuf> {
    let path = dir.join(REPORT_FILE_NAME);
    let report_error = |e: std::io::Error| ReadyCheckError::ReportError {
        path: path.clone(),
        message: e.to_string(),
    };

    fs::create_dir_all(dir).map_err(report_error)?;
    let json = report.to_json()?;
    let mut file = fs::File::create(&path).map_err(report_error)?;
    file.write_all(json.as_bytes()).map_err(report_error)?;
    file.write_all(b"\n").map_err(report_error)?;
    Ok(path)
}

/// Read a report written by [`write_report`].
///
/// The embedded verdict is dropped so it cannot be mistaken for a score.
pub fn load_report(path: &Path) -> Result<AssessmentReport> {
    let content = fs::read_to_string(path).map_err(|e| ReadyCheckError::ReportError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let mut report: AssessmentReport =
        serde_json::from_str(&content).map_err(|e| ReadyCheckError::ReportError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    report.verdict = None;
    Ok(report)
}
