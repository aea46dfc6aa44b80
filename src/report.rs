//! # Status Reporting
//!
//! The reconciler reports human-readable status lines through a `StatusSink`.
//! Two kinds of line exist: informational (`Clone done - ...`,
//! `Checked out submodules.`) and warnings (`WARNING: Failed to ...`).
//!
//! - **`ConsoleSink`**: Writes info lines to stdout and warnings to stderr,
//!   with an emoji or bracketed prefix depending on `OutputConfig`.
//! - **`RecordingSink`**: Keeps every line in memory, for embedding callers
//!   and tests.
//!
//! ## Respecting User Preferences
//!
//! `OutputConfig` honours `--color=never|always|auto`, `NO_COLOR`,
//! `CLICOLOR=0`, `CLICOLOR_FORCE=1` and `TERM=dumb`, falling back to the
//! `console` crate's terminal detection.

use std::env;

use serde::Serialize;

/// Receives status lines from the reconciler.
pub trait StatusSink {
    fn info(&mut self, message: &str);
    fn warning(&mut self, message: &str);
}

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// `always` and `never` force the choice; anything else detects it from
    /// the environment.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // The presence of NO_COLOR (even if empty) disables colors
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    pub fn plain() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Returns `emoji_str` when colors are enabled and `plain` otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// Prints status lines to the terminal and mirrors them to the log.
#[derive(Debug, Clone, Default)]
pub struct ConsoleSink {
    output: OutputConfig,
}

impl ConsoleSink {
    pub fn new(output: OutputConfig) -> Self {
        Self { output }
    }

    fn info_line(&self, message: &str) -> String {
        format!("{} {}", emoji(&self.output, "✅", "[OK]"), message)
    }

    fn warning_line(&self, message: &str) -> String {
        let prefix = emoji(&self.output, "⚠️", "[WARN]");
        let line = format!("{} {}", prefix, message);
        if self.output.use_color {
            console::style(line).yellow().to_string()
        } else {
            line
        }
    }
}

impl StatusSink for ConsoleSink {
    fn info(&mut self, message: &str) {
        log::debug!("status: {}", message);
        println!("{}", self.info_line(message));
    }

    fn warning(&mut self, message: &str) {
        log::debug!("status: {}", message);
        eprintln!("{}", self.warning_line(message));
    }
}

/// A recorded status line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "level", content = "message", rename_all = "lowercase")]
pub enum Status {
    Info(String),
    Warning(String),
}

/// Collects status lines in the order they were reported.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub lines: Vec<Status>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|line| match line {
            Status::Warning(message) => Some(message.as_str()),
            Status::Info(_) => None,
        })
    }

    pub fn infos(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|line| match line {
            Status::Info(message) => Some(message.as_str()),
            Status::Warning(_) => None,
        })
    }
}

impl StatusSink for RecordingSink {
    fn info(&mut self, message: &str) {
        self.lines.push(Status::Info(message.to_string()));
    }

    fn warning(&mut self, message: &str) {
        self.lines.push(Status::Warning(message.to_string()));
    }
}
