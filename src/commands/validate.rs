//! # Validate Command Implementation
//!
//! This module implements the `validate` subcommand, which parses the
//! repository declarations file and checks every declaration without running
//! any git command.
//!
//! Problems are listed per declaration index. The command fails if any
//! declaration is invalid.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use provision_git::config::{self, DEFAULT_CONFIG_FILE};
use provision_git::report::{emoji, OutputConfig};

/// Validate a repository declarations file
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the repository declarations file to validate.
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "PROVISION_GIT_CONFIG",
        default_value = DEFAULT_CONFIG_FILE
    )]
    pub config: PathBuf,
}

/// Execute the `validate` command.
///
/// # Arguments
/// * `args` - The command arguments
/// * `color_flag` - The value of the global --color flag ("always", "never", or "auto")
pub fn execute(args: ValidateArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    println!(
        "{} Validating configuration: {}",
        emoji(&out, "🔍", "[SCAN]"),
        args.config.display()
    );

    let git_config = match config::from_file(&args.config) {
        Ok(git_config) => git_config,
        Err(e) => {
            println!(
                "{} Configuration parsing failed: {}",
                emoji(&out, "❌", "[ERR]"),
                e
            );
            return Err(anyhow::anyhow!("Configuration parsing failed: {}", e));
        }
    };

    println!("   Repositories declared: {}", git_config.repos.len());

    let errors = git_config.validate();
    if errors.is_empty() {
        println!("{} Configuration is valid", emoji(&out, "✅", "[OK]"));
        return Ok(());
    }

    for (index, messages) in &errors {
        let label = git_config.repos[*index]
            .path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or("<no path>");
        for message in messages {
            println!(
                "{} repos[{}] ({}): {}",
                emoji(&out, "❌", "[ERR]"),
                index,
                label,
                message
            );
        }
    }
    anyhow::bail!("{} invalid repository declaration(s)", errors.len())
}
