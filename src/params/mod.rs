//! Parameter aggregation across snapshots
//!
//! This module turns the parameter files of every requested snapshot into a
//! single [`ParamsResult`]. Each submodule handles one step of the flow for a
//! snapshot:
//!
//! - [`collect`] decides which files carry parameters
//! - [`read`] loads them, reporting unreadable files as diagnostics
//! - [`vars`] gathers variables pipeline stages consumed through interpolation
//! - [`show`] drives the steps for every snapshot and assembles the result
//! - [`dedup`] hides the working copy when it matches the checked-out branch
//!
//! [`diff`] compares two snapshots of a result for reporting.

pub mod collect;
pub mod dedup;
pub mod diff;
pub mod read;
pub mod show;
pub mod vars;

use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::brancher::SnapshotId;
use crate::loader::ParsedContent;

pub use diff::{diff, ParamChange};
pub use show::show;

/// Parameters of one snapshot, keyed by file location.
pub type SnapshotParams = BTreeMap<String, ParsedContent>;

/// Parameters of every snapshot that had any, in enumeration order.
pub type ParamsResult = IndexMap<SnapshotId, SnapshotParams>;

/// Options for [`show`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowOptions {
    /// Stage names, addresses, globs or file paths. Empty means everything.
    pub targets: Vec<String>,
    /// Report only the keys stages declare instead of whole files.
    pub deps: bool,
    /// Drop the working copy when it equals the active snapshot.
    pub hide_workspace: bool,
}

impl Default for ShowOptions {
    fn default() -> Self {
        Self {
            targets: Vec::new(),
            deps: false,
            hide_workspace: true,
        }
    }
}

impl ShowOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.targets = targets.into_iter().map(Into::into).collect();
        self
    }

    pub fn deps(mut self, deps: bool) -> Self {
        self.deps = deps;
        self
    }

    pub fn hide_workspace(mut self, hide: bool) -> Self {
        self.hide_workspace = hide;
        self
    }
}
