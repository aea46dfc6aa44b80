//! # Error Handling
//!
//! This module defines the centralized error type for `provision-git`. It uses
//! the `thiserror` library to describe every failure that stops the processing
//! of a declaration or a configuration file.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum covering configuration problems, unsupported
//!   declaration modes, process spawn failures and the wrapped I/O and YAML
//!   errors.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! A git command that runs and exits non-zero is *not* an error at this level.
//! It is reported through a `CommandResult` and the reconciler decides what it
//! means. Only a child process that could not be created at all surfaces as
//! `Error::Spawn`.

use std::collections::BTreeMap;

use thiserror::Error;

/// Validation problems keyed by the index of the offending declaration.
pub type ValidationErrors = BTreeMap<usize, Vec<String>>;

/// Main error type for provision-git operations
#[derive(Error, Debug)]
pub enum Error {
    /// The configuration file could not be understood.
    #[error("Configuration parsing error: {message}")]
    ConfigParse { message: String },

    /// One or more repository declarations failed validation.
    #[error("Configuration validation failed: {}", format_validation(errors))]
    ConfigValidation { errors: ValidationErrors },

    /// A declaration requested a mode that is declared but not supported.
    #[error("NotImplemented: {feature}")]
    NotImplemented { feature: String },

    /// The child process for a command could not be started.
    #[error("Failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

fn format_validation(errors: &ValidationErrors) -> String {
    errors
        .iter()
        .map(|(index, messages)| format!("repos[{}]: {}", index, messages.join(" ")))
        .collect::<Vec<_>>()
        .join("; ")
}
