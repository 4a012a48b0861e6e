//! List command implementation.
//!
//! The `readycheck list` command lists categories and their checks.

use serde_json::json;

use crate::checks::{builtin_catalogue, Category};
use crate::cli::args::ListArgs;
use crate::config::{load_config, ConfigOverrides, ConfigSources};
use crate::error::{ReadyCheckError, Result};
use crate::ui::theme::ReadyTheme;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The list command implementation.
pub struct ListCommand {
    sources: ConfigSources,
    args: ListArgs,
}

impl ListCommand {
    /// Create a new list command.
    pub fn new(sources: ConfigSources, args: ListArgs) -> Self {
        Self { sources, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ListArgs {
        &self.args
    }
}

impl Command for ListCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = load_config(&self.sources, &ConfigOverrides::default())?;
        let categories = builtin_catalogue(&config);

        if self.args.json {
            let value = json!(categories.iter().map(category_json).collect::<Vec<_>>());
            let text =
                serde_json::to_string_pretty(&value).map_err(|e| ReadyCheckError::Other(e.into()))?;
            ui.message(&text);
            return Ok(CommandResult::success());
        }

        let theme = ReadyTheme::new();
        let total = categories.len();
        for (index, category) in categories.iter().enumerate() {
            let mut heading = format!(
                "{} {}",
                theme.format_category(&category.name, index + 1, total),
                theme.dim.apply_to(format!("({})", category.slug()))
            );
            if category.parallel {
                heading.push_str(&format!(" {}", theme.dim.apply_to("parallel")));
            }
            ui.message(&heading);
            for check in &category.checks {
                ui.message(&format!("    {}", check.name()));
            }
        }
        ui.message("");
        ui.message(&format!(
            "{} checks in {} categories. Select with --only/--skip using the names in parentheses.",
            categories.iter().map(Category::len).sum::<usize>(),
            total
        ));

        Ok(CommandResult::success())
    }
}

fn category_json(category: &Category) -> serde_json::Value {
    json!({
        "name": category.name,
        "slug": category.slug(),
        "parallel": category.parallel,
        "checks": category.checks.iter().map(|c| c.name()).collect::<Vec<_>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use tempfile::TempDir;

    #[test]
    fn list_shows_builtin_categories() {
        let temp = TempDir::new().unwrap();
        let cmd = ListCommand::new(ConfigSources::discover(temp.path()), ListArgs::default());
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert!(result.success);
        assert!(ui.has_message("Infrastructure"));
        assert!(ui.has_message("(security-headers)"));
        assert!(ui.has_message("Strict-Transport-Security present"));
        assert!(ui.has_message("Create customers"));
    }

    #[test]
    fn list_json_has_slugs_and_checks() {
        let temp = TempDir::new().unwrap();
        let cmd = ListCommand::new(
            ConfigSources::discover(temp.path()),
            ListArgs { json: true },
        );
        let mut ui = MockUI::new();

        cmd.execute(&mut ui).unwrap();

        let value: serde_json::Value = serde_json::from_str(&ui.messages()[0]).unwrap();
        let categories = value.as_array().unwrap();
        assert_eq!(categories[0]["slug"], "infrastructure");
        assert!(categories
            .iter()
            .any(|c| c["slug"] == "tenant-isolation"));
        assert_eq!(categories[1]["parallel"], true);
    }
}
