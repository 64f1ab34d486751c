//! Aggregate parameters across every snapshot

use log::debug;

use crate::brancher::{with_snapshot, Brancher, SnapshotId};
use crate::diagnostics::DiagnosticObserver;
use crate::error::{Error, Result};
use crate::filesystem::Tree;
use crate::pipeline::load_stages;

use super::collect::collect_configs;
use super::dedup::hide_workspace;
use super::read::read_params;
use super::vars::collect_vars;
use super::{ParamsResult, ShowOptions, SnapshotParams};

/// Collect the parameters of every snapshot `brancher` yields.
///
/// Snapshots without any parameters are left out of the result. Fails with
/// [`Error::NoParams`] when no snapshot has any.
pub fn show(
    brancher: &dyn Brancher,
    options: &ShowOptions,
    observer: &dyn DiagnosticObserver,
) -> Result<ParamsResult> {
    let mut result = ParamsResult::new();

    for snapshot in brancher.snapshots()? {
        let params = with_snapshot(brancher, &snapshot, |tree| {
            collect_snapshot(tree, &snapshot, options, observer)
        })?;

        if params.is_empty() {
            debug!("No params found on '{}'", snapshot);
            continue;
        }
        result.insert(snapshot, params);
    }

    if result.is_empty() {
        return Err(Error::NoParams);
    }

    if options.hide_workspace {
        hide_workspace(&mut result, &brancher.active_snapshot(), observer);
    }

    Ok(result)
}

/// Collect the parameters of a single snapshot tree.
pub fn collect_snapshot(
    tree: &dyn Tree,
    snapshot: &SnapshotId,
    options: &ShowOptions,
    observer: &dyn DiagnosticObserver,
) -> Result<SnapshotParams> {
    let stages = load_stages(tree)?;
    let (deps, locations) = collect_configs(&stages, &options.targets)?;
    let mut params = read_params(tree, snapshot, &deps, &locations, options.deps, observer);

    // Keys are disjoint: files already read are skipped by collect_vars
    let vars = collect_vars(&stages, &params);
    params.extend(vars);

    Ok(params)
}
