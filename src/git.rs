//! Thin wrappers around the system `git` command
//!
//! All commands run with `-C <root>` and only ever read repository state.

use std::path::Path;
use std::process::{Command, Output};

use log::trace;

use crate::error::Error;

fn git(root: &Path, args: &[&str]) -> Result<Output, Error> {
    trace!("git -C {} {}", root.display(), args.join(" "));
    Command::new("git")
        .arg("-C")
        .arg(root)
        .args(args)
        .output()
        .map_err(|e| Error::GitCommand {
            command: args.join(" "),
            stderr: e.to_string(),
        })
}

fn git_stdout(root: &Path, args: &[&str]) -> Result<String, Error> {
    let output = git(root, args)?;
    if !output.status.success() {
        return Err(Error::GitCommand {
            command: args.join(" "),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

fn lines(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Check whether `root` is inside a Git work tree
pub fn is_repository(root: &Path) -> bool {
    git(root, &["rev-parse", "--is-inside-work-tree"])
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Resolve a revision name to a full commit hash
pub fn resolve_revision(root: &Path, rev: &str) -> Result<String, Error> {
    let object = format!("{}^{{commit}}", rev);
    let output = git(root, &["rev-parse", "--verify", "--quiet", &object])?;
    if !output.status.success() {
        return Err(Error::UnknownRevision {
            rev: rev.to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// List local branch names
pub fn list_branches(root: &Path) -> Result<Vec<String>, Error> {
    let stdout = git_stdout(
        root,
        &["for-each-ref", "--format=%(refname:short)", "refs/heads"],
    )?;
    Ok(lines(&stdout))
}

/// List tag names
pub fn list_tags(root: &Path) -> Result<Vec<String>, Error> {
    let stdout = git_stdout(
        root,
        &["for-each-ref", "--format=%(refname:short)", "refs/tags"],
    )?;
    Ok(lines(&stdout))
}

/// List every commit reachable from any ref, newest first
pub fn list_commits(root: &Path) -> Result<Vec<String>, Error> {
    let stdout = git_stdout(root, &["rev-list", "--all"])?;
    Ok(lines(&stdout))
}

/// Name of the checked-out branch, `None` when HEAD is detached
pub fn current_branch(root: &Path) -> Result<Option<String>, Error> {
    let output = git(root, &["symbolic-ref", "--short", "-q", "HEAD"])?;
    match output.status.code() {
        Some(0) => Ok(Some(
            String::from_utf8_lossy(&output.stdout).trim().to_string(),
        )),
        // `symbolic-ref -q` exits with 1 when HEAD is not a symbolic ref
        Some(1) => Ok(None),
        _ => Err(Error::GitCommand {
            command: "symbolic-ref --short -q HEAD".to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }),
    }
}

/// Path of `root` below the top of its work tree, `/`-terminated or empty
pub fn show_prefix(root: &Path) -> Result<String, Error> {
    let stdout = git_stdout(root, &["rev-parse", "--show-prefix"])?;
    Ok(stdout.trim().to_string())
}

/// List all files of a commit as `/`-separated repository paths
pub fn list_files(root: &Path, rev: &str) -> Result<Vec<String>, Error> {
    let stdout = git_stdout(root, &["ls-tree", "-r", "--name-only", "--full-tree", rev])?;
    Ok(lines(&stdout))
}

/// Read a file's content at a commit
pub fn show_file(root: &Path, rev: &str, path: &str) -> Result<Vec<u8>, Error> {
    let object = format!("{}:{}", rev, path);
    let output = git(root, &["show", &object])?;
    if !output.status.success() {
        return Err(Error::GitCommand {
            command: format!("show {}", object),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(output.stdout)
}
