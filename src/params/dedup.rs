//! Hide the working copy when it matches the checked-out branch

use log::debug;

use crate::brancher::ActiveSnapshot;
use crate::defaults::WORKSPACE;
use crate::diagnostics::{Diagnostic, DiagnosticObserver};

use super::ParamsResult;

/// Remove the workspace entry from `result` if it equals the entry of the
/// active snapshot. Returns true if the workspace was removed.
///
/// The active snapshot matches an entry when it is one of the entry's names,
/// so `main` matches a grouped `main,v1.0` entry.
pub fn hide_workspace(
    result: &mut ParamsResult,
    active: &ActiveSnapshot,
    observer: &dyn DiagnosticObserver,
) -> bool {
    let name = match active {
        ActiveSnapshot::Resolved(name) => name,
        ActiveSnapshot::Unavailable(reason) => {
            debug!("Active snapshot unavailable ({:?}), keeping workspace", reason);
            return false;
        }
    };

    let Some(active_id) = result
        .keys()
        .find(|id| !id.is_workspace() && id.names().any(|n| n == name))
        .cloned()
    else {
        return false;
    };

    let identical = match (result.get(WORKSPACE), result.get(&active_id)) {
        (Some(workspace), Some(active_params)) => workspace == active_params,
        _ => false,
    };

    if identical {
        result.shift_remove(WORKSPACE);
        observer.observe(Diagnostic::WorkspaceHidden { active: active_id });
    }
    identical
}
