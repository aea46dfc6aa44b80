//! # Configuration Schema and Parsing
//!
//! This module defines the data structures for the repository declarations
//! attached to a machine, and the logic for parsing, validating and defaulting
//! them.
//!
//! ## Key Components
//!
//! - **`GitConfig`**: The `{ repos: [...] }` document, an ordered list of raw
//!   declarations exactly as the user wrote them.
//!
//! - **`RepositoryDeclaration`**: One raw, user-authored entry. Every field is
//!   optional at this stage so that validation can report all problems at once.
//!
//! - **`Declaration`**: A validated and defaulted declaration. It can only be
//!   obtained through `finalize`, so the reconciler never sees an entry without
//!   a `target` or a `path`.
//!
//! ## Example
//!
//! ```yaml
//! repos:
//!   - target: https://github.com/example/tools.git
//!     path: /srv/tools
//!     branch: main
//!     sync_on_load: true
//!   - target: /mirrors/app.git
//!     path: ./app
//!     set_upstream: git@github.com:example/app.git
//! ```
//!
//! The camelCase spellings (`cloneInHost`, `syncOnLoad`, `setUpstream`) are
//! accepted as aliases.

use crate::error::{Error, Result, ValidationErrors};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Configuration file read when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = ".provision-git.yaml";

/// A single repository declaration as written in the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepositoryDeclaration {
    /// The git remote URL or local path to clone from.
    pub target: Option<String>,
    /// Where the working copy must live on the host.
    pub path: Option<String>,
    /// Branch to clone and pull. The remote's default branch when unset.
    pub branch: Option<String>,
    /// Clone on the host rather than inside the guest. Defaults to `true`.
    #[serde(alias = "cloneInHost")]
    pub clone_in_host: Option<bool>,
    /// Fetch and pull an existing checkout on every run. Defaults to `false`.
    #[serde(alias = "syncOnLoad")]
    pub sync_on_load: Option<bool>,
    /// URL to set on `origin` after a fresh clone.
    #[serde(alias = "setUpstream")]
    pub set_upstream: Option<String>,
}

impl RepositoryDeclaration {
    /// Creates a declaration with the two required fields set.
    pub fn new(target: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            target: Some(target.into()),
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Returns every problem with this declaration. Empty when valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if is_blank(&self.target) {
            errors.push("target must not be empty.".to_string());
        }
        if is_blank(&self.path) {
            errors.push("path must not be empty.".to_string());
        }
        if matches!(&self.branch, Some(b) if b.trim().is_empty()) {
            errors.push("branch must not be empty when set.".to_string());
        }
        if matches!(&self.set_upstream, Some(u) if u.trim().is_empty()) {
            errors.push("set_upstream must not be empty when set.".to_string());
        }
        // Values are passed to git as arguments and must not read as options.
        let fields = [
            ("target", &self.target),
            ("path", &self.path),
            ("branch", &self.branch),
            ("set_upstream", &self.set_upstream),
        ];
        for (name, value) in fields {
            if value.as_deref().is_some_and(|v| v.starts_with('-')) {
                errors.push(format!("{} must not start with '-'.", name));
            }
        }
        errors
    }

    /// Validates the declaration and fills in the defaults.
    ///
    /// Consuming `self` means defaulting happens exactly once.
    pub fn finalize(self) -> std::result::Result<Declaration, Vec<String>> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Declaration {
            target: self.target.unwrap_or_default(),
            path: PathBuf::from(self.path.unwrap_or_default()),
            branch: self.branch,
            clone_in_host: self.clone_in_host.unwrap_or(true),
            sync_on_load: self.sync_on_load.unwrap_or(false),
            set_upstream: self.set_upstream,
        })
    }
}

/// Compares paths component-wise, ignoring `.` components and trailing slashes.
fn same_path(a: &Path, b: &Path) -> bool {
    fn significant(p: &Path) -> Vec<Component<'_>> {
        p.components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect::<Vec<_>>()
    }
    significant(a) == significant(b)
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}

/// A validated, defaulted and immutable repository declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    target: String,
    path: PathBuf,
    branch: Option<String>,
    clone_in_host: bool,
    sync_on_load: bool,
    set_upstream: Option<String>,
}

impl Declaration {
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    pub fn clone_in_host(&self) -> bool {
        self.clone_in_host
    }

    pub fn sync_on_load(&self) -> bool {
        self.sync_on_load
    }

    pub fn set_upstream(&self) -> Option<&str> {
        self.set_upstream.as_deref()
    }
}

/// The repository section of a machine's configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GitConfig {
    /// Declarations in the order they will be reconciled.
    #[serde(default)]
    pub repos: Vec<RepositoryDeclaration>,
}

impl GitConfig {
    /// Appends a declaration and returns the config, for building configs in code.
    pub fn with_repo(mut self, repo: RepositoryDeclaration) -> Self {
        self.repos.push(repo);
        self
    }

    /// Validates every declaration, keyed by position.
    ///
    /// Besides the per-declaration checks, two declarations may not share a
    /// `path`: reconciliation assumes every working copy is independent.
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        for (index, repo) in self.repos.iter().enumerate() {
            let mut repo_errors = repo.validate();
            if let Some(path) = repo.path.as_deref().filter(|p| !p.trim().is_empty()) {
                let earlier = self.repos[..index].iter().position(|other| {
                    other
                        .path
                        .as_deref()
                        .is_some_and(|p| same_path(Path::new(p), Path::new(path)))
                });
                if let Some(first) = earlier {
                    repo_errors.push(format!("path duplicates repos[{}].", first));
                }
            }
            if !repo_errors.is_empty() {
                errors.insert(index, repo_errors);
            }
        }
        errors
    }

    /// Validates the whole config and turns it into finalized declarations.
    pub fn finalize(self) -> Result<Vec<Declaration>> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(Error::ConfigValidation { errors });
        }
        self.repos
            .into_iter()
            .enumerate()
            .map(|(index, repo)| {
                repo.finalize().map_err(|messages| Error::ConfigValidation {
                    errors: ValidationErrors::from([(index, messages)]),
                })
            })
            .collect()
    }
}

/// Parses a YAML string into a `GitConfig`.
///
/// An empty document (or one holding only comments) is an empty config.
pub fn parse(yaml_content: &str) -> Result<GitConfig> {
    let value: serde_yaml::Value = serde_yaml::from_str(yaml_content)?;
    match value {
        serde_yaml::Value::Null => Ok(GitConfig::default()),
        serde_yaml::Value::Mapping(_) => Ok(serde_yaml::from_value(value)?),
        _ => Err(Error::ConfigParse {
            message: "Expected a mapping with a `repos` list at the top level".to_string(),
        }),
    }
}

/// Parse a `GitConfig` from a YAML file path
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<GitConfig> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    parse(&content)
}
