//! Collect variables that pipeline stages consumed through interpolation

use crate::content::deep_merge;
use crate::stage::Stage;

use super::SnapshotParams;

/// Gather the tracked vars of every pipeline stage, keyed by file.
///
/// Files already present in `params` are skipped entirely: an explicitly
/// declared parameters file is reported as read, never through tracked vars.
/// Vars of the same file from several stages merge recursively.
pub fn collect_vars(stages: &[Stage], params: &SnapshotParams) -> SnapshotParams {
    let mut vars = SnapshotParams::new();

    for stage in stages.iter().filter(|stage| stage.is_pipeline()) {
        for (file, tracked) in &stage.tracked_vars {
            let key = file.to_string();
            if params.contains_key(&key) {
                continue;
            }
            deep_merge(vars.entry(key).or_default(), tracked.clone());
        }
    }

    vars
}
