//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// readycheck - Black-box readiness assessment for multi-tenant web services.
#[derive(Debug, Parser)]
#[command(name = "readycheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides ./readycheck.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Show verbose output, including details of passing checks
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the readiness assessment (default if no command specified)
    Run(RunArgs),

    /// Recompute the score of a saved report
    Score(ScoreArgs),

    /// Show resolved configuration with secrets redacted
    Config(ConfigArgs),

    /// List categories and their checks
    List(ListArgs),
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RunArgs {
    /// Base URL of the service under test
    #[arg(long, value_name = "URL")]
    pub target: Option<String>,

    /// Tenant identifier sent in X-Tenant-ID
    #[arg(long)]
    pub tenant: Option<String>,

    /// Dotenv file to load (default: .env.test.local or .env.test)
    #[arg(long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Probe an already running service; never spawn the server
    #[arg(long)]
    pub production: bool,

    /// Run only these categories (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,

    /// Skip these categories (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Run independent checks of a category concurrently
    #[arg(long)]
    pub parallel: bool,

    /// Directory for the report and subprocess logs
    #[arg(long, value_name = "DIR")]
    pub report_dir: Option<PathBuf>,

    /// Do not write assessment-report.json
    #[arg(long)]
    pub no_report: bool,

    /// Print the report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `score` command.
#[derive(Debug, Clone, clap::Args)]
pub struct ScoreArgs {
    /// Path to an assessment-report.json
    pub report: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `config` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ConfigArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Dotenv file to load
    #[arg(long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_parses() {
        let cli = Cli::try_parse_from(["readycheck"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn run_args_parse() {
        let cli = Cli::try_parse_from([
            "readycheck",
            "run",
            "--target",
            "http://localhost:4000",
            "--only",
            "infrastructure,security-headers",
            "--parallel",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Run(args)) => {
                assert_eq!(args.target.as_deref(), Some("http://localhost:4000"));
                assert_eq!(args.only, vec!["infrastructure", "security-headers"]);
                assert!(args.parallel);
                assert!(!args.no_report);
            }
            other => panic!("expected run, got {:?}", other),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["readycheck", "list", "--quiet", "--no-color"]).unwrap();
        assert!(cli.quiet);
        assert!(cli.no_color);
    }

    #[test]
    fn score_requires_report() {
        assert!(Cli::try_parse_from(["readycheck", "score"]).is_err());

        let cli = Cli::try_parse_from(["readycheck", "score", "out/report.json"]).unwrap();
        match cli.command {
            Some(Commands::Score(args)) => {
                assert_eq!(args.report, PathBuf::from("out/report.json"));
            }
            other => panic!("expected score, got {:?}", other),
        }
    }

    #[test]
    fn verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["readycheck", "-v", "-q"]).is_err());
    }
}
