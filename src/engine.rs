//! # Repository Reconciliation
//!
//! This module brings the host filesystem into agreement with a list of
//! repository declarations.
//!
//! ## Decision Procedure
//!
//! For each declaration, in order:
//!
//! 1.  A declaration with `clone_in_host: false` fails immediately with
//!     `Error::NotImplemented`; no git command runs.
//! 2.  If `<path>/.git` exists (any entry, valid repository or not), the
//!     working copy is left alone unless `sync_on_load` is set, in which case
//!     it is fetched and then pulled. A failed fetch does not prevent the pull.
//! 3.  Otherwise the repository is cloned (on `branch` when given). A failed
//!     clone is reported and ends the work for that declaration.
//! 4.  After a successful clone, `origin` is rewritten to `set_upstream` when
//!     given, and submodules are initialised when `<path>/.gitmodules` exists.
//!     Failures of either step are warnings only.
//!
//! Submodules of an existing working copy are not updated by a sync.
//!
//! `reconcile_all` never stops early: a declaration that fails hard is
//! reported and recorded in the `Summary`, and the next one is processed.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use serde::Serialize;

use crate::config::{Declaration, GitConfig};
use crate::error::{Error, Result};
use crate::report::StatusSink;
use crate::runner::{CommandRunner, GitOperation};

/// What reconciling one declaration did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The working copy exists and `sync_on_load` is off.
    Unchanged,
    /// The working copy existed and was fetched and pulled.
    Synced { fetched: bool, pulled: bool },
    /// A fresh clone succeeded. `None` means the step did not apply.
    Cloned {
        upstream: Option<bool>,
        submodules: Option<bool>,
    },
    /// The clone exited non-zero.
    CloneFailed,
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::CloneFailed)
    }
}

/// The result for one declaration within a `Summary`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub target: String,
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Entry {
    pub fn is_failure(&self) -> bool {
        self.error.is_some() || self.outcome.is_some_and(|o| o.is_failure())
    }
}

/// Per-declaration results of one `reconcile_all` pass, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub entries: Vec<Entry>,
}

impl Summary {
    fn record(&mut self, decl: &Declaration, result: Result<Outcome>) {
        let (outcome, error) = match result {
            Ok(outcome) => (Some(outcome), None),
            Err(e) => (None, Some(e.to_string())),
        };
        self.entries.push(Entry {
            target: decl.target().to_string(),
            path: decl.path().to_path_buf(),
            outcome,
            error,
        });
    }

    pub fn has_failures(&self) -> bool {
        self.entries.iter().any(Entry::is_failure)
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome.as_ref().is_some_and(&pred))
            .count()
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cloned = self.count(|o| matches!(o, Outcome::Cloned { .. }));
        let synced = self.count(|o| matches!(o, Outcome::Synced { .. }));
        let unchanged = self.count(|o| matches!(o, Outcome::Unchanged));
        let failed = self.entries.iter().filter(|e| e.is_failure()).count();
        let noun = if self.entries.len() == 1 {
            "repository"
        } else {
            "repositories"
        };
        write!(
            f,
            "{} {}: {} cloned, {} synced, {} unchanged, {} failed",
            self.entries.len(),
            noun,
            cloned,
            synced,
            unchanged,
            failed
        )
    }
}

/// Drives a `CommandRunner` through the git steps each declaration needs.
pub struct Reconciler<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> Reconciler<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Reconciles every declaration in order and summarises the results.
    pub fn reconcile_all(&self, decls: &[Declaration], sink: &mut dyn StatusSink) -> Summary {
        let mut summary = Summary::default();
        for decl in decls {
            let result = self.reconcile_one(decl, sink);
            if let Err(e) = &result {
                error!("{}: {}", decl.path().display(), e);
                sink.warning(&format!("WARNING: {}", e));
            }
            summary.record(decl, result);
        }
        info!("{}", summary);
        summary
    }

    /// Reconciles a single declaration.
    ///
    /// Returns `Err` only for an unsupported mode or a command that could not
    /// be spawned; git failures are part of the `Outcome`.
    pub fn reconcile_one(&self, decl: &Declaration, sink: &mut dyn StatusSink) -> Result<Outcome> {
        if !decl.clone_in_host() {
            return Err(Error::NotImplemented {
                feature: "clone_in_host=>false".to_string(),
            });
        }

        let path = decl.path();
        if has_entry(&path.join(".git")) {
            if decl.sync_on_load() {
                self.sync(decl, sink)
            } else {
                debug!("{} already cloned, nothing to do", path.display());
                Ok(Outcome::Unchanged)
            }
        } else {
            self.clone_fresh(decl, sink)
        }
    }

    fn sync(&self, decl: &Declaration, sink: &mut dyn StatusSink) -> Result<Outcome> {
        let path = decl.path().to_path_buf();
        info!("Syncing {}", path.display());

        let fetched = self
            .runner
            .execute(&GitOperation::Fetch { path: path.clone() })?
            .succeeded();
        if !fetched {
            warn!("fetch failed in {}", path.display());
        }

        let pulled = self
            .runner
            .execute(&GitOperation::Pull {
                path: path.clone(),
                branch: decl.branch().map(str::to_string),
            })?
            .succeeded();
        if !pulled {
            sink.warning(&format!("WARNING: Failed to sync {}", path.display()));
        }

        Ok(Outcome::Synced { fetched, pulled })
    }

    fn clone_fresh(&self, decl: &Declaration, sink: &mut dyn StatusSink) -> Result<Outcome> {
        let path = decl.path().to_path_buf();
        info!("Cloning {} into {}", decl.target(), path.display());

        let cloned = self
            .runner
            .execute(&GitOperation::Clone {
                target: decl.target().to_string(),
                path: path.clone(),
                branch: decl.branch().map(str::to_string),
            })?
            .succeeded();
        if !cloned {
            sink.warning(&format!(
                "WARNING: Failed to clone {} into {}",
                decl.target(),
                path.display()
            ));
            return Ok(Outcome::CloneFailed);
        }

        let upstream = match decl.set_upstream() {
            Some(url) => {
                sink.info(&format!(
                    "Clone done - setting upstream of {} to {}",
                    path.display(),
                    url
                ));
                let ok = self
                    .runner
                    .execute(&GitOperation::SetUpstream {
                        path: path.clone(),
                        url: url.to_string(),
                    })?
                    .succeeded();
                if !ok {
                    sink.warning(&format!(
                        "WARNING: Failed to change upstream to {} in {}",
                        url,
                        path.display()
                    ));
                }
                Some(ok)
            }
            None => None,
        };

        let submodules = if has_entry(&path.join(".gitmodules")) {
            let ok = self
                .runner
                .execute(&GitOperation::SubmoduleUpdate { path: path.clone() })?
                .succeeded();
            if ok {
                sink.info("Checked out submodules.");
            } else {
                sink.warning(&format!(
                    "WARNING: Failed to check out submodules for {}",
                    path.display()
                ));
            }
            Some(ok)
        } else {
            None
        };

        Ok(Outcome::Cloned {
            upstream,
            submodules,
        })
    }
}

/// True when anything (file, directory or dangling symlink) exists at `path`.
fn has_entry(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Validates a machine's repository config and reconciles it.
///
/// This is the post-boot entry point: nothing runs if any declaration is
/// invalid.
pub fn provision<R: CommandRunner>(
    config: GitConfig,
    runner: R,
    sink: &mut dyn StatusSink,
) -> Result<Summary> {
    let decls = config.finalize()?;
    Ok(Reconciler::new(runner).reconcile_all(&decls, sink))
}
