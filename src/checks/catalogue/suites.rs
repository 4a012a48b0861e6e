//! External test-runner commands, one check each.

use crate::checks::{Category, CheckVerdict};
use crate::config::{HarnessConfig, SuiteConfig};
use crate::shell::{self, CommandOptions};
use anyhow::Context;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub fn category(config: &HarnessConfig) -> Category {
    let env: HashMap<String, String> = [
        ("API_BASE_URL", config.target.base_url.clone()),
        ("TENANT_ID", config.target.tenant_id.clone()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();

    config
        .suites
        .iter()
        .fold(Category::new("Test Suites"), |category, suite| {
            let options = CommandOptions {
                cwd: suite.cwd.clone(),
                env: env.clone(),
                timeout: Some(
                    suite
                        .timeout_secs
                        .map(Duration::from_secs)
                        .unwrap_or(config.timeouts.suite()),
                ),
                log_path: Some(log_path(&config.report_dir, suite)),
                ..CommandOptions::default()
            };
            let command = suite.command.clone();
            category.check(suite.name.clone(), move |ctx| {
                let options = CommandOptions {
                    interrupt: ctx.interrupt(),
                    ..options.clone()
                };
                run_suite(&command, &options)
            })
        })
}

/// `<report_dir>/suite-<name>.log`, with the name reduced to safe characters.
pub fn log_path(report_dir: &Path, suite: &SuiteConfig) -> PathBuf {
    let name: String = suite
        .name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect();
    report_dir.join(format!("suite-{}.log", name))
}

fn run_suite(command: &str, options: &CommandOptions) -> anyhow::Result<CheckVerdict> {
    if let Some(dir) = options.log_path.as_deref().and_then(Path::parent) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("cannot create {}", dir.display()))?;
    }

    let result = shell::execute(command, options)?;
    if result.success {
        return Ok(CheckVerdict::pass(result.summary()));
    }

    let mut detail = result.summary();
    if let Some(last) = result.output_tail.iter().rev().find(|l| !l.trim().is_empty()) {
        detail.push_str(": ");
        detail.push_str(last.trim());
    }
    Ok(CheckVerdict::fail(detail))
}
