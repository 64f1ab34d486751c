//! Resolve which files carry parameters in a snapshot

use crate::defaults::DEFAULT_PARAMS_FILE;
use crate::error::Result;
use crate::path::{glob_match, is_glob, normalize, FileLocation};
use crate::stage::{ParamsDependency, Stage};

/// Returns the params dependencies of the stages selected by `targets`, plus
/// plain files to read directly.
///
/// With no targets every stage is selected and the default parameters file is
/// added unless a stage already covers it. A target may also name the file of
/// a declared params dependency, by path or glob, which selects that
/// dependency from every stage. A target that selects nothing is read as a
/// file path.
pub fn collect_configs(
    stages: &[Stage],
    targets: &[String],
) -> Result<(Vec<ParamsDependency>, Vec<FileLocation>)> {
    let mut deps: Vec<ParamsDependency> = Vec::new();
    let mut locations: Vec<FileLocation> = Vec::new();

    if targets.is_empty() {
        for stage in stages {
            extend_unique(&mut deps, &stage.params);
        }

        let default = FileLocation::new(DEFAULT_PARAMS_FILE);
        let covered =
            locations.contains(&default) || deps.iter().any(|dep| dep.location == default);
        if !covered {
            locations.push(default);
        }
        return Ok((deps, locations));
    }

    for target in targets {
        let mut matched = false;
        for stage in stages {
            if matches_target(stage, target)? {
                matched = true;
                extend_unique(&mut deps, &stage.params);
            }
        }

        for stage in stages {
            for dep in &stage.params {
                if matches_location(&dep.location, target)? {
                    matched = true;
                    extend_unique(&mut deps, std::slice::from_ref(dep));
                }
            }
        }

        if !matched {
            let location = FileLocation::new(target);
            if !locations.contains(&location) {
                locations.push(location);
            }
        }
    }

    Ok((deps, locations))
}

fn extend_unique(deps: &mut Vec<ParamsDependency>, incoming: &[ParamsDependency]) {
    for dep in incoming {
        if !deps.contains(dep) {
            deps.push(dep.clone());
        }
    }
}

/// Returns true if `target` names `location`, literally or as a glob.
fn matches_location(location: &FileLocation, target: &str) -> Result<bool> {
    if location.as_str() == normalize(target) {
        return Ok(true);
    }
    if is_glob(target) {
        return glob_match(target, location.as_str());
    }
    Ok(false)
}

/// Returns true if `target` selects `stage`.
pub fn matches_target(stage: &Stage, target: &str) -> Result<bool> {
    let address = stage.address();
    if stage.name == target || address == target || stage.definition.as_str() == normalize(target)
    {
        return Ok(true);
    }
    if is_glob(target) {
        return Ok(glob_match(target, &stage.name)? || glob_match(target, &address)?);
    }
    Ok(false)
}
