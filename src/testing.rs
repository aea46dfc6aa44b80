//! Test doubles shared by the unit and property tests.

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::error::Result;
use crate::runner::{CommandResult, CommandRunner, GitInvocation};

/// One recorded process: working directory and arguments.
pub type Call = (Option<PathBuf>, Vec<String>);

/// Records every invocation and fakes git's effect on the filesystem.
///
/// A successful `clone` creates `<path>/.git`, plus `<path>/.gitmodules` when
/// `clone_creates_gitmodules` is set. Subcommands listed in `failing` exit 1.
pub struct MockRunner {
    pub calls: Arc<Mutex<Vec<Call>>>,
    pub failing: Vec<&'static str>,
    pub clone_creates_gitmodules: bool,
}

impl MockRunner {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            failing: Vec::new(),
            clone_creates_gitmodules: false,
        }
    }

    pub fn failing(mut self, subcommand: &'static str) -> Self {
        self.failing.push(subcommand);
        self
    }

    pub fn with_gitmodules(mut self) -> Self {
        self.clone_creates_gitmodules = true;
        self
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, invocation: &GitInvocation) -> Result<CommandResult> {
        let args: Vec<String> = invocation
            .args()
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        self.calls
            .lock()
            .unwrap()
            .push((invocation.workdir().map(PathBuf::from), args.clone()));

        let subcommand = args.first().map(String::as_str).unwrap_or_default();
        if self.failing.contains(&subcommand) {
            return Ok(CommandResult::from_code(1));
        }

        if subcommand == "clone" {
            let dest = PathBuf::from(args.last().unwrap());
            fs::create_dir_all(dest.join(".git"))?;
            if self.clone_creates_gitmodules {
                fs::write(dest.join(".gitmodules"), "")?;
            }
        }
        Ok(CommandResult::success())
    }
}

/// Renders recorded calls as `git <args>` strings for compact assertions.
pub fn commands(calls: &Arc<Mutex<Vec<Call>>>) -> Vec<String> {
    calls
        .lock()
        .unwrap()
        .iter()
        .map(|(_, args)| format!("git {}", args.join(" ")))
        .collect()
}
