//! # CLI Command Implementations
//!
//! Each subcommand of `provision-git` lives in its own file with:
//! - An `Args` struct that defines the command-specific options, derived
//!   using `clap`.
//! - An `execute` function that performs the command by calling into the
//!   `provision_git` library.

pub mod completions;
pub mod sync;
pub mod validate;
