//! Shared test utilities for integration and E2E tests.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! let repo = TestRepo::git();
//! repo.write("params.yaml", "lr: 0.1\n").commit("init");
//! repo.cmd().arg("show").assert().success();
//! ```

use std::path::Path;
use std::process::Command;

use assert_fs::prelude::*;

/// Common imports for E2E tests.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    pub use super::{git_available, TestRepo};
}

/// Check whether a usable `git` binary is on the PATH.
///
/// Tests that need real revisions return early when it is not.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// A temporary project directory, optionally a Git repository.
pub struct TestRepo {
    temp_dir: assert_fs::TempDir,
}

impl TestRepo {
    /// An empty directory without version control.
    pub fn plain() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// An empty Git repository with `main` checked out.
    pub fn git() -> Self {
        let repo = Self::plain();
        repo.run_git(&["init", "--quiet"]);
        repo.run_git(&["symbolic-ref", "HEAD", "refs/heads/main"]);
        repo
    }

    /// Write a file relative to the repository root.
    pub fn write(&self, path: &str, content: &str) -> &Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Delete a file relative to the repository root.
    #[allow(dead_code)]
    pub fn remove(&self, path: &str) -> &Self {
        std::fs::remove_file(self.temp_dir.path().join(path)).expect("Failed to remove file");
        self
    }

    /// Stage everything and commit it.
    pub fn commit(&self, message: &str) -> &Self {
        self.run_git(&["add", "--all"]);
        self.run_git(&["commit", "--quiet", "--allow-empty", "-m", message]);
        self
    }

    /// Run a git command in the repository, panicking when it fails.
    pub fn run_git(&self, args: &[&str]) -> &Self {
        let output = Command::new("git")
            .arg("-C")
            .arg(self.path())
            .args([
                "-c",
                "user.name=Test User",
                "-c",
                "user.email=test@example.com",
                "-c",
                "commit.gpgsign=false",
                "-c",
                "tag.gpgsign=false",
                "-c",
                "init.defaultBranch=main",
            ])
            .args(args)
            .output()
            .expect("Failed to run git");
        assert!(
            output.status.success(),
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr)
        );
        self
    }

    /// The repository root.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// A `repo-params` command running in the repository root.
    ///
    /// Color and inherited root or log settings are cleared so output is stable.
    pub fn cmd(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("repo-params");
        cmd.current_dir(self.path())
            .env_remove("REPO_PARAMS_ROOT")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1");
        cmd
    }
}
