//! Run command implementation.
//!
//! The `readycheck run` command executes the assessment and scores it.

use tracing::info;

use crate::checks::{builtin_catalogue, filter_categories, CheckContext};
use crate::cli::args::RunArgs;
use crate::config::{load_config, ConfigOverrides, ConfigSources, HarnessConfig};
use crate::error::Result;
use crate::probe::{ProbeExecutor, ProbeRequest};
use crate::report::{write_report, AssessmentReport};
use crate::runner::{InterruptFlag, RunCoordinator, RunProgress};
use crate::secrets::{is_secret_key, Redactor};
use crate::supervisor::{ProcessSpec, ProcessSupervisor, ReadinessPolicy, StopOutcome};
use crate::ui::{format_duration, SpinnerHandle, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// File the supervised server's output is written to.
pub const SERVER_LOG_NAME: &str = "server.log";

/// The run command implementation.
pub struct RunCommand {
    sources: ConfigSources,
    args: RunArgs,
}

impl RunCommand {
    /// Create a new run command.
    pub fn new(sources: ConfigSources, args: RunArgs) -> Self {
        Self { sources, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &RunArgs {
        &self.args
    }

    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            base_url: self.args.target.clone(),
            tenant_id: self.args.tenant.clone(),
            production_mode: self.args.production,
            report_dir: self.args.report_dir.clone(),
        }
    }
}

impl Command for RunCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = load_config(&self.sources, &self.overrides())?;

        let (categories, unknown) =
            filter_categories(builtin_catalogue(&config), &self.args.only, &self.args.skip);
        if !unknown.is_empty() {
            ui.error(&format!(
                "Unknown categories: {}. Run 'readycheck list' to see them.",
                unknown.join(", ")
            ));
            return Ok(CommandResult::failure(1));
        }

        let executor = ProbeExecutor::new(
            &config.target.base_url,
            config.timeouts.request(),
            config.target.insecure_tls,
        )?
        .with_tenant(&config.target.tenant_id);
        let ctx = CheckContext::new(executor);

        let mut coordinator = RunCoordinator::new(categories)
            .with_interrupt(InterruptFlag::with_signal_handlers())
            .with_run_timeout(config.timeouts.run())
            .with_parallel(self.args.parallel)
            .with_redactor(build_redactor(&config));
        if let Some(supervisor) = build_supervisor(&config) {
            coordinator = coordinator.with_supervisor(supervisor);
        } else if config.production_mode {
            info!("Production mode: probing {} without spawning", config.target.base_url);
        }

        ui.show_header(&format!(
            "Readiness assessment of {} (tenant {})",
            config.target.base_url, config.target.tenant_id
        ));

        let mut spinner: Option<Box<dyn SpinnerHandle>> = None;
        let outcome = coordinator.run(&ctx, |event| match event {
            RunProgress::ServerStarting { command } => {
                spinner = Some(ui.start_spinner(&format!("Starting '{}'", command)));
            }
            RunProgress::ServerReady { after } => {
                if let Some(mut s) = spinner.take() {
                    s.finish_success(&format!("Server ready after {}", format_duration(after)));
                }
            }
            RunProgress::ServerStopped { outcome } => {
                if let Some(mut s) = spinner.take() {
                    s.finish_error("Server did not become ready");
                }
                if outcome == StopOutcome::Forced {
                    ui.warning("Server ignored the stop signal and was killed");
                }
            }
            RunProgress::CategoryStarting {
                name,
                index,
                total,
                checks,
            } => ui.show_category(name, index + 1, total, checks),
            RunProgress::CheckFinished { result } => ui.show_result(result),
            RunProgress::CategoryFinished {
                name,
                passed,
                total,
            } => ui.finish_category(name, passed, total),
            RunProgress::Aborted { reason, skipped } => {
                ui.warning(&format!("Run stopped early: {} ({} checks skipped)", reason, skipped));
            }
        })?;

        ui.show_summary(&outcome.verdict, outcome.duration);

        let report = AssessmentReport::from_run(
            &outcome,
            &config.target.base_url,
            &config.target.tenant_id,
        );
        if !self.args.no_report {
            let path = write_report(&config.report_dir, &report)?;
            ui.success(&format!("Report written to {}", path.display()));
        }
        if self.args.json {
            println!("{}", report.to_json()?);
        }

        Ok(CommandResult::with_exit_code(outcome.exit_code()))
    }
}

/// Redactor seeded with the configured password and secret-looking env values.
pub fn build_redactor(config: &HarnessConfig) -> Redactor {
    let mut redactor = Redactor::new();
    if let Some(password) = &config.target.password {
        redactor.add_secret(password.as_str());
    }
    if let Some(server) = &config.server {
        for (key, value) in &server.env {
            if is_secret_key(key) {
                redactor.add_secret(value.as_str());
            }
        }
    }
    redactor
}

/// Supervisor for the configured server, unless none should be spawned.
pub fn build_supervisor(config: &HarnessConfig) -> Option<ProcessSupervisor> {
    if !config.should_spawn_server() {
        return None;
    }
    let server = config.server.as_ref()?;
    let spec = ProcessSpec {
        command: server.command.clone(),
        cwd: server.cwd.clone(),
        env: server.env.clone(),
        log_path: config.report_dir.join(SERVER_LOG_NAME),
    };
    let readiness = ReadinessPolicy {
        probe: ProbeRequest::get(config.readiness_path()),
        interval: config.timeouts.readiness_interval(),
        timeout: config.timeouts.readiness(),
    };
    Some(ProcessSupervisor::new(
        spec,
        readiness,
        config.timeouts.shutdown_grace(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::supervisor::ProcessState;
    use std::collections::HashMap;

    fn config_with_server() -> HarnessConfig {
        let mut config = HarnessConfig::default();
        config.server = Some(ServerConfig {
            command: "npm run dev".to_string(),
            cwd: None,
            env: HashMap::from([
                ("JWT_SECRET".to_string(), "s3cret-value".to_string()),
                ("PORT".to_string(), "3001".to_string()),
            ]),
            health_path: Some("/ready".to_string()),
        });
        config.target.password = Some("hunter2".to_string());
        config
    }

    #[test]
    fn redactor_masks_password_and_secret_env() {
        let redactor = build_redactor(&config_with_server());

        assert_eq!(redactor.secret_count(), 2);
        let detail = redactor.redact("login hunter2 with s3cret-value on 3001");
        assert!(!detail.contains("hunter2"));
        assert!(!detail.contains("s3cret-value"));
        assert!(detail.contains("3001"));
    }

    #[test]
    fn supervisor_built_when_server_configured() {
        let supervisor = build_supervisor(&config_with_server()).unwrap();
        assert_eq!(supervisor.command(), "npm run dev");
        assert_eq!(supervisor.state(), &ProcessState::NotStarted);
        assert!(supervisor
            .summary()
            .log_path
            .ends_with(SERVER_LOG_NAME));
    }

    #[test]
    fn production_mode_skips_supervisor() {
        let mut config = config_with_server();
        config.production_mode = true;
        assert!(build_supervisor(&config).is_none());
    }

    #[test]
    fn no_server_means_no_supervisor() {
        assert!(build_supervisor(&HarnessConfig::default()).is_none());
    }

    #[test]
    fn overrides_follow_flags() {
        let args = RunArgs {
            target: Some("http://localhost:4000".to_string()),
            production: true,
            ..RunArgs::default()
        };
        let cmd = RunCommand::new(ConfigSources::discover(std::path::Path::new(".")), args);
        let overrides = cmd.overrides();

        assert_eq!(overrides.base_url.as_deref(), Some("http://localhost:4000"));
        assert!(overrides.production_mode);
        assert!(overrides.tenant_id.is_none());
    }
}
