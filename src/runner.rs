//! # Git Command Execution
//!
//! This module turns the git operations the reconciler needs into processes.
//!
//! ## Design
//!
//! - **`GitOperation`**: One logical step (clone, fetch, pull, submodule
//!   update, set upstream). Its `Display` renders the classic shell form, e.g.
//!   `cd '/srv/app'; git pull origin 'main';`, which is what appears in logs
//!   and dry-run output.
//!
//! - **`GitInvocation`**: One `git` process: an optional working directory and
//!   a discrete argument vector. Arguments are never joined into a shell
//!   string, so quotes or metacharacters in a URL, path or branch name cannot
//!   change what runs.
//!
//! - **`CommandRunner`**: The seam between the reconciler and the OS. The
//!   default `SystemRunner` spawns real processes; `DryRunRunner` only logs.
//!   Tests substitute a recording mock.
//!
//! A non-zero exit code is an ordinary `CommandResult`. Only a process that
//! cannot be spawned at all is an `Error::Spawn`.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, info};

use crate::error::{Error, Result};

/// Termination status of one child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandResult {
    /// `None` when the child was terminated by a signal.
    pub exit_code: Option<i32>,
}

impl CommandResult {
    pub fn from_code(code: i32) -> Self {
        Self {
            exit_code: Some(code),
        }
    }

    pub fn success() -> Self {
        Self::from_code(0)
    }

    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// A single `git` process to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitInvocation {
    workdir: Option<PathBuf>,
    args: Vec<OsString>,
}

impl GitInvocation {
    fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            workdir: None,
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    fn in_dir(mut self, dir: &Path) -> Self {
        self.workdir = Some(dir.to_path_buf());
        self
    }

    /// Directory the process runs in, or the caller's directory when `None`.
    pub fn workdir(&self) -> Option<&Path> {
        self.workdir.as_deref()
    }

    /// Arguments passed to `git`, excluding the program name.
    pub fn args(&self) -> &[OsString] {
        &self.args
    }
}

impl fmt::Display for GitInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(dir) = &self.workdir {
            write!(f, "cd {} && ", quote(&dir.to_string_lossy()))?;
        }
        write!(f, "git")?;
        for arg in &self.args {
            let arg = arg.to_string_lossy();
            if arg.starts_with('-') || is_plain_word(&arg) {
                write!(f, " {}", arg)?;
            } else {
                write!(f, " {}", quote(&arg))?;
            }
        }
        Ok(())
    }
}

fn is_plain_word(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ':' | '@'))
}

/// Single-quotes a string for display, escaping embedded quotes as `'\''`.
pub fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// One logical git step performed by the reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitOperation {
    Clone {
        target: String,
        path: PathBuf,
        branch: Option<String>,
    },
    Fetch {
        path: PathBuf,
    },
    /// Without a branch this is a fetch followed by a pull of the tracking
    /// branch; the pull decides the outcome.
    Pull {
        path: PathBuf,
        branch: Option<String>,
    },
    SubmoduleUpdate {
        path: PathBuf,
    },
    SetUpstream {
        path: PathBuf,
        url: String,
    },
}

impl GitOperation {
    /// Expands the operation into the processes that implement it.
    pub fn invocations(&self) -> Vec<GitInvocation> {
        match self {
            GitOperation::Clone {
                target,
                path,
                branch,
            } => {
                let mut args: Vec<OsString> = vec!["clone".into()];
                if let Some(branch) = branch {
                    args.push("-b".into());
                    args.push(branch.into());
                }
                args.push(target.into());
                args.push(path.into());
                vec![GitInvocation::new(args)]
            }
            GitOperation::Fetch { path } => vec![GitInvocation::new(["fetch"]).in_dir(path)],
            GitOperation::Pull { path, branch: None } => vec![
                GitInvocation::new(["fetch"]).in_dir(path),
                GitInvocation::new(["pull"]).in_dir(path),
            ],
            GitOperation::Pull {
                path,
                branch: Some(branch),
            } => vec![GitInvocation::new(["pull", "origin", branch.as_str()]).in_dir(path)],
            GitOperation::SubmoduleUpdate { path } => {
                vec![GitInvocation::new(["submodule", "update", "--init", "--recursive"]).in_dir(path)]
            }
            GitOperation::SetUpstream { path, url } => {
                vec![GitInvocation::new(["remote", "set-url", "origin", url.as_str()]).in_dir(path)]
            }
        }
    }
}

impl fmt::Display for GitOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GitOperation::Clone {
                target,
                path,
                branch: None,
            } => write!(f, "git clone {} {}", quote(target), quote_path(path)),
            GitOperation::Clone {
                target,
                path,
                branch: Some(branch),
            } => write!(
                f,
                "git clone -b {} {} {}",
                quote(branch),
                quote(target),
                quote_path(path)
            ),
            GitOperation::Fetch { path } => write!(f, "cd {}; git fetch", quote_path(path)),
            GitOperation::Pull { path, branch: None } => {
                write!(f, "cd {}; git fetch; git pull;", quote_path(path))
            }
            GitOperation::Pull {
                path,
                branch: Some(branch),
            } => write!(
                f,
                "cd {}; git pull origin {};",
                quote_path(path),
                quote(branch)
            ),
            GitOperation::SubmoduleUpdate { path } => write!(
                f,
                "cd {} && git submodule update --init --recursive",
                quote_path(path)
            ),
            GitOperation::SetUpstream { path, url } => write!(
                f,
                "cd {}; git remote set-url origin {};",
                quote_path(path),
                quote(url)
            ),
        }
    }
}

fn quote_path(path: &Path) -> String {
    quote(&path.to_string_lossy())
}

/// Runs git processes for the reconciler.
pub trait CommandRunner: Send + Sync {
    /// Runs one process to completion and returns its termination status.
    fn run(&self, invocation: &GitInvocation) -> Result<CommandResult>;

    /// Runs every process of an operation in order and returns the status of
    /// the last one. Earlier failures do not stop later processes.
    fn execute(&self, operation: &GitOperation) -> Result<CommandResult> {
        debug!("Running: {}", operation);
        let mut last = CommandResult::success();
        for invocation in operation.invocations() {
            last = self.run(&invocation)?;
        }
        Ok(last)
    }
}

/// The default runner, which spawns the system `git` and waits for it.
///
/// Authentication is whatever the ambient git setup provides: SSH keys,
/// credential helpers and `~/.gitconfig`.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    program: OsString,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::with_program("git")
    }

    /// Uses a different executable in place of `git`.
    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &GitInvocation) -> Result<CommandResult> {
        let mut command = Command::new(&self.program);
        command.args(invocation.args());
        if let Some(dir) = invocation.workdir() {
            command.current_dir(dir);
        }

        let status = command.status().map_err(|source| Error::Spawn {
            command: invocation.to_string(),
            source,
        })?;

        debug!("`{}` exited with {:?}", invocation, status.code());
        Ok(CommandResult {
            exit_code: status.code(),
        })
    }
}

/// A runner that logs each command and reports success without running it.
#[derive(Debug, Clone, Default)]
pub struct DryRunRunner;

impl CommandRunner for DryRunRunner {
    fn run(&self, invocation: &GitInvocation) -> Result<CommandResult> {
        info!("[dry-run] {}", invocation);
        Ok(CommandResult::success())
    }
}
