//! Shared test utilities for the CLI end-to-end tests.
//!
//! Add `mod common;` to a test file, then `use common::prelude::*;`.

use assert_fs::prelude::*;
use std::path::Path;
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::init_source_repo;
    pub use super::TestFixture;
}

/// A temporary directory holding a `.provision-git.yaml`.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Writes `.provision-git.yaml`, replacing `{root}` with the fixture path.
    pub fn with_config(self, content: &str) -> Self {
        let content = content.replace("{root}", &self.path().to_string_lossy());
        self.temp_dir
            .child(".provision-git.yaml")
            .write_str(&content)
            .expect("Failed to write config file");
        self
    }

    /// Creates `<name>/.git` so the declaration counts as already cloned.
    pub fn with_existing_checkout(self, name: &str) -> Self {
        self.temp_dir
            .child(name)
            .child(".git")
            .create_dir_all()
            .expect("Failed to create checkout");
        self
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }
}

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(["-c", "user.name=Test", "-c", "user.email=test@example.com"])
        .args(args)
        .current_dir(dir)
        .status()
        .expect("Failed to run git");
    assert!(status.success(), "git {:?} failed", args);
}

/// Creates a repository with one commit on `main` at `dir`.
pub fn init_source_repo(dir: &Path) {
    std::fs::create_dir_all(dir).expect("Failed to create source dir");
    git(dir, &["init", "--quiet"]);
    git(dir, &["checkout", "--quiet", "-b", "main"]);
    std::fs::write(dir.join("README.md"), "# source\n").expect("Failed to write README");
    git(dir, &["add", "README.md"]);
    git(dir, &["commit", "--quiet", "-m", "initial"]);
}
