//! # Provision Git CLI
//!
//! This is the binary entry point for the `provision-git` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Setting up logging and dispatching to the selected command.
//! - Turning failures into a non-zero exit status for the calling
//!   provisioner.
//!
//! The reconciliation logic lives in the `provision_git` library crate; the
//! binary is a thin wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
