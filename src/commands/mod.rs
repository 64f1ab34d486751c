//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `repo-params` command-line tool. Each subcommand is defined in its own file.
//!
//! ## Structure
//!
//! Each command module contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and performs the
//!   command's logic, calling into the `repo_params` library.

pub mod completions;
pub mod diff;
pub mod show;

use std::path::Path;

use anyhow::Result;

use repo_params::repository::Repo;
use repo_params::suggestions;

/// Open the repository at `root`, turning failures into hinted errors.
pub fn open_repo(root: &Path) -> Result<Repo> {
    if !root.is_dir() {
        return Err(suggestions::repo_root_not_found(root));
    }
    Repo::open(root).map_err(|e| suggestions::for_error(e, None))
}
