//! # Sync Command Implementation
//!
//! The `sync` subcommand is the post-boot trigger. It loads the machine's
//! repository declarations, validates them, and reconciles each one against
//! the host filesystem.
//!
//! Nothing is cloned or pulled when any declaration is invalid. Failures of
//! individual repositories are reported and do not stop the others, but they
//! make the command exit non-zero so the provisioner can notice.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use provision_git::config::{self, DEFAULT_CONFIG_FILE};
use provision_git::engine::{provision, Summary};
use provision_git::report::{emoji, ConsoleSink, OutputConfig, RecordingSink, Status, StatusSink};
use provision_git::runner::{DryRunRunner, SystemRunner};

/// Clone or sync every declared repository
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Path to the repository declarations file
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "PROVISION_GIT_CONFIG",
        default_value = DEFAULT_CONFIG_FILE
    )]
    pub config: PathBuf,

    /// Print the git commands that would run without running them
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Print the result as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    summary: &'a Summary,
    messages: &'a [Status],
}

/// Execute the `sync` command.
pub fn execute(args: SyncArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }
    let git_config = config::from_file(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?;

    let summary = if args.json {
        let mut sink = RecordingSink::new();
        let summary = run(git_config, args.dry_run, &mut sink)?;
        let report = JsonReport {
            summary: &summary,
            messages: &sink.lines,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        summary
    } else {
        let mut sink = ConsoleSink::new(out.clone());
        let summary = run(git_config, args.dry_run, &mut sink)?;
        println!("{} {}", emoji(&out, "📦", "[DONE]"), summary);
        summary
    };

    if summary.has_failures() {
        let failed = summary.entries.iter().filter(|e| e.is_failure()).count();
        anyhow::bail!("{} of {} repositories failed", failed, summary.entries.len());
    }
    Ok(())
}

fn run(
    git_config: config::GitConfig,
    dry_run: bool,
    sink: &mut dyn StatusSink,
) -> Result<Summary> {
    let summary = if dry_run {
        provision(git_config, DryRunRunner, sink)?
    } else {
        provision(git_config, SystemRunner::new(), sink)?
    };
    Ok(summary)
}
