//! Check command implementation.

use anyhow::{bail, Result};
use aep_lint::{any_problems, DescriptorInputs, DualPipeline, FileDescriptorSet};
use clap::Args;
use std::path::{Path, PathBuf};

use crate::config_resolver;
use crate::OutputFormat;

/// Arguments of `aep-lint check`.
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Proto files to lint; every file in the descriptor sets when empty
    pub files: Vec<String>,

    /// JSON-encoded FileDescriptorSet to read (repeatable)
    #[arg(long = "descriptor-set-in", value_name = "FILE", required = true)]
    pub descriptor_sets: Vec<PathBuf>,

    /// Enable rules matching this prefix (repeatable)
    #[arg(long = "enable-rule", value_name = "PREFIX")]
    pub enable_rules: Vec<String>,

    /// Disable rules matching this prefix (repeatable)
    #[arg(long = "disable-rule", value_name = "PREFIX")]
    pub disable_rules: Vec<String>,

    /// Output format
    #[arg(short, long, alias = "output-format", default_value = "text")]
    pub format: OutputFormat,

    /// Write results to this file instead of stdout
    #[arg(short, long = "output-path", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Exit with status 1 when any problem is found
    #[arg(long)]
    pub set_exit_status: bool,

    /// Report problems even where comments disable the rule
    #[arg(long)]
    pub ignore_comment_disables: bool,

    /// Let rule panics abort the run instead of reporting them
    #[arg(long)]
    pub debug: bool,
}

/// Runs the check command.
///
/// Returns `true` when the process should exit with the problems status.
pub fn run(args: &CheckArgs, config_path: Option<&Path>) -> Result<bool> {
    let source = config_resolver::resolve(Path::new("."), config_path);
    let configs = source
        .load()?
        .with_overrides(&args.enable_rules, &args.disable_rules)?;

    let set = read_descriptor_sets(&args.descriptor_sets)?;
    let inputs = DescriptorInputs::from_set(set, &args.files)?;

    let pipeline = DualPipeline::with_builtin_rules(configs)?
        .ignore_comment_disables(args.ignore_comment_disables)
        .debug(args.debug);

    tracing::info!(
        "Linting {} file(s) with {} legacy and {} native rule(s)",
        inputs.legacy.len(),
        pipeline.legacy_registry().len(),
        pipeline.native_registry().len()
    );

    let results = pipeline.run_inputs(&inputs)?;
    super::output::write(&results, args.format, args.output_path.as_deref())?;

    Ok(args.set_exit_status && any_problems(&results))
}

fn read_descriptor_sets(paths: &[PathBuf]) -> Result<FileDescriptorSet> {
    if paths.is_empty() {
        bail!("At least one --descriptor-set-in is required");
    }
    let sets = paths
        .iter()
        .map(|p| FileDescriptorSet::from_file(p))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(FileDescriptorSet::merge(sets))
}
