//! Compare the parameters of two snapshots

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;

use crate::content::flatten;

use super::SnapshotParams;

/// One parameter compared between two snapshots
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamChange {
    /// Location of the parameters file.
    pub path: String,
    /// Dotted key inside the file.
    pub param: String,
    pub old: Option<Value>,
    pub new: Option<Value>,
}

impl ParamChange {
    pub fn is_changed(&self) -> bool {
        self.old != self.new
    }
}

/// Compare `old` and `new` leaf by leaf.
///
/// Changes are sorted by path, then param. Unchanged parameters are included
/// only when `include_unchanged` is set.
pub fn diff(
    old: &SnapshotParams,
    new: &SnapshotParams,
    include_unchanged: bool,
) -> Vec<ParamChange> {
    let paths: BTreeSet<&String> = old.keys().chain(new.keys()).collect();
    let mut changes = Vec::new();

    for path in paths {
        let old_leaves = old.get(path).map(flatten).unwrap_or_default();
        let new_leaves = new.get(path).map(flatten).unwrap_or_default();
        let params: BTreeSet<&String> = old_leaves.keys().chain(new_leaves.keys()).collect();

        for param in params {
            let change = ParamChange {
                path: path.clone(),
                param: param.clone(),
                old: old_leaves.get(param).cloned(),
                new: new_leaves.get(param).cloned(),
            };
            if include_unchanged || change.is_changed() {
                changes.push(change);
            }
        }
    }

    changes
}
