//! Config command implementation.
//!
//! The `readycheck config` command shows resolved configuration.

use crate::cli::args::ConfigArgs;
use crate::config::{load_config, ConfigOverrides, ConfigSources};
use crate::error::{ReadyCheckError, Result};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The config command implementation.
pub struct ConfigCommand {
    sources: ConfigSources,
    args: ConfigArgs,
}

impl ConfigCommand {
    /// Create a new config command.
    pub fn new(sources: ConfigSources, args: ConfigArgs) -> Self {
        Self { sources, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ConfigArgs {
        &self.args
    }
}

impl Command for ConfigCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = load_config(&self.sources, &ConfigOverrides::default())?.redacted();

        if self.args.json {
            let json =
                serde_json::to_string_pretty(&config).map_err(|e| ReadyCheckError::Other(e.into()))?;
            ui.message(&json);
        } else {
            for path in &config.sources {
                ui.message(&format!("# {}", path.display()));
            }
            if !config.sources.is_empty() {
                ui.message("");
            }
            let yaml = serde_yaml::to_string(&config).map_err(|e| ReadyCheckError::Other(e.into()))?;
            ui.message(&yaml);
        }

        Ok(CommandResult::success())
    }
}
