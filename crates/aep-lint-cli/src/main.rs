//! aep-lint CLI tool.
//!
//! Usage:
//! ```bash
//! aep-lint check --descriptor-set-in set.json [OPTIONS] [FILES]...
//! aep-lint list-rules
//! aep-lint init
//! ```
//!
//! Exit status: `0` on success, `1` when problems were found and
//! `--set-exit-status` is given, `2` on any fatal error.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Protocol buffer API linter for API Enhancement Proposals
#[derive(Parser)]
#[command(name = "aep-lint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lint proto files from compiled descriptor sets
    Check(commands::check::CheckArgs),

    /// List available rules
    ListRules {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// GitHub Actions workflow annotations.
    Github,
    /// Problem counts per rule and pipeline.
    Summary,
}

const EXIT_PROBLEMS: u8 = 1;
const EXIT_FATAL: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let outcome = match cli.command {
        Commands::Check(args) => commands::check::run(&args, cli.config.as_deref()),
        Commands::ListRules { format } => commands::list_rules::run(format).map(|()| false),
        Commands::Init { force } => {
            commands::init::run(std::path::Path::new("."), force).map(|()| false)
        }
    };

    match outcome {
        Ok(false) => ExitCode::SUCCESS,
        Ok(true) => ExitCode::from(EXIT_PROBLEMS),
        Err(err) => {
            commands::report(err);
            ExitCode::from(EXIT_FATAL)
        }
    }
}
