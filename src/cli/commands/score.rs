//! Score command implementation.
//!
//! The `readycheck score` command rescores a saved report.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::args::ScoreArgs;
use crate::error::{ReadyCheckError, Result};
use crate::report::load_report;
use crate::scoring::score;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The score command implementation.
pub struct ScoreCommand {
    base_dir: PathBuf,
    args: ScoreArgs,
}

impl ScoreCommand {
    /// Create a new score command.
    pub fn new(base_dir: &Path, args: ScoreArgs) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
            args,
        }
    }

    fn report_path(&self) -> PathBuf {
        if self.args.report.is_absolute() {
            self.args.report.clone()
        } else {
            self.base_dir.join(&self.args.report)
        }
    }
}

impl Command for ScoreCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let report = load_report(&self.report_path())?;
        let verdict = score(&report.results);

        if self.args.json {
            let json = serde_json::to_string_pretty(&verdict)
                .map_err(|e| ReadyCheckError::Other(e.into()))?;
            println!("{}", json);
        } else {
            ui.show_header(&format!(
                "Assessment of {} (tenant {}) from {}",
                report.target,
                report.tenant,
                report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
            ));
            ui.show_summary(&verdict, Duration::from_millis(report.duration_ms));
        }
        if let Some(reason) = &report.interrupted {
            ui.warning(&format!(
                "The run was interrupted ({}); {} checks were skipped",
                reason, report.skipped
            ));
        }

        Ok(CommandResult::with_exit_code(verdict.exit_code()))
    }
}
