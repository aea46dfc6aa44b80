//! # Provision Git Library
//!
//! This library makes sure the git repositories declared for a machine are
//! present on the host, optionally pinned to a branch, with submodules
//! initialised, and optionally re-synced on every provisioning run. It is
//! designed to be driven by the `provision-git` command-line tool as a
//! post-boot hook, but the reconciler can be embedded directly.
//!
//! ## Quick Example
//!
//! ```no_run
//! use provision_git::config;
//! use provision_git::engine::provision;
//! use provision_git::report::RecordingSink;
//! use provision_git::runner::SystemRunner;
//!
//! let config = config::parse(
//!     r#"
//! repos:
//!   - target: https://github.com/example/tools.git
//!     path: /srv/tools
//!     sync_on_load: true
//! "#,
//! )
//! .unwrap();
//!
//! let mut sink = RecordingSink::new();
//! let summary = provision(config, SystemRunner::new(), &mut sink).unwrap();
//! assert!(!summary.has_failures());
//! ```
//!
//! ## Core Concepts
//!
//! - **Configuration (`config`)**: Parses the `{ repos: [...] }` document and
//!   turns raw entries into validated, defaulted `Declaration`s.
//! - **Command execution (`runner`)**: Describes each git step and runs it as
//!   a process through the `CommandRunner` trait.
//! - **Reconciliation (`engine`)**: Decides, per declaration, whether to
//!   clone, sync or leave the working copy alone.
//! - **Reporting (`report`)**: The `StatusSink` that receives the
//!   human-readable status lines.

pub mod config;
pub mod engine;
pub mod error;
pub mod report;
pub mod runner;

#[cfg(test)]
mod engine_proptest;
#[cfg(test)]
mod testing;
