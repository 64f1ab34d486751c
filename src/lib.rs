//! # Repository Parameters Library
//!
//! This library collects the parameter files of a pipeline repository across
//! several snapshots (the working copy, branches, tags, commits) and reports
//! the effective parameters of each one. It is designed to be used by the
//! `repo-params` command-line tool but can also be embedded in other tools.
//!
//! ## Quick Example
//!
//! ```
//! use repo_params::brancher::MemoryBrancher;
//! use repo_params::diagnostics::NoopObserver;
//! use repo_params::filesystem::MemoryFS;
//! use repo_params::params::{self, ShowOptions};
//!
//! let workspace = MemoryFS::new().with_file("params.yaml", "lr: 0.2\n").unwrap();
//! let main = MemoryFS::new().with_file("params.yaml", "lr: 0.1\n").unwrap();
//! let brancher = MemoryBrancher::new(workspace)
//!     .snapshot("main", main)
//!     .active("main");
//!
//! let result = params::show(&brancher, &ShowOptions::default(), &NoopObserver).unwrap();
//! assert_eq!(result.len(), 2);
//! assert_eq!(result["main"]["params.yaml"]["lr"], 0.1);
//! ```
//!
//! ## Core Concepts
//!
//! - **Snapshots (`brancher`)**: a [`brancher::Brancher`] enumerates snapshots
//!   and gives scoped, read-only access to each one's files. `RepoBrancher`
//!   serves a Git repository through `repository` and `git`; `MemoryBrancher`
//!   serves in-memory trees.
//! - **Loaders (`loader`)**: YAML, JSON, TOML and INI files parse into the
//!   same nested representation, selected by file suffix.
//! - **Stages (`stage`, `config`, `pipeline`, `interpolate`)**: stages defined
//!   in `pipeline.yaml` and `*.stage.yaml` files declare parameter
//!   dependencies. Pipeline stages also record the variables they consumed
//!   through `${...}` interpolation.
//! - **Aggregation (`params`)**: resolves, reads and merges the parameters of
//!   each snapshot, then hides the working copy when it matches the checked
//!   out branch.
//! - **Reporting (`render`, `output`)**: tables and Markdown for the CLI.
//!
//! ## Execution Flow
//!
//! For every snapshot, in enumeration order:
//!
//! 1.  **Stages**: load every stage definition of the snapshot.
//! 2.  **Sources**: pick the params dependencies of the targeted stages and
//!     any plain files, plus `params.yaml` by default.
//! 3.  **Read**: parse each file; unreadable files become diagnostics.
//! 4.  **Vars**: add tracked variables of files not read explicitly.
//!
//! Snapshots without parameters are dropped, and an empty overall result is
//! an error.

pub mod brancher;
pub mod config;
pub mod content;
pub mod defaults;
pub mod diagnostics;
pub mod error;
pub mod filesystem;
pub mod git;
pub mod interpolate;
pub mod loader;
pub mod output;
pub mod params;
pub mod path;
pub mod pipeline;
pub mod render;
pub mod repository;
pub mod stage;
pub mod suggestions;

#[cfg(test)]
mod path_proptest;
