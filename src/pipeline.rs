//! Stage discovery
//!
//! Walks a snapshot's tree for `pipeline.yaml` and `*.stage.yaml` files and
//! turns them into [`Stage`]s. Pipeline stages are interpolated against their
//! vars context; single-stage files are taken as written.

use indexmap::IndexMap;
use log::{debug, trace};

use crate::config::{self, ParamsEntry, PathEntry, StageDefinition, VarsEntry};
use crate::defaults::{DEFAULT_PARAMS_FILE, PIPELINE_FILE, STAGE_FILE_SUFFIX};
use crate::error::{Error, Result};
use crate::filesystem::Tree;
use crate::interpolate::{Context, VarsSource};
use crate::loader;
use crate::path::FileLocation;
use crate::stage::{ParamsDependency, Stage, StageKind, TrackedVars};

/// Load every stage defined in `tree`.
///
/// Any malformed definition aborts loading.
pub fn load_stages(tree: &dyn Tree) -> Result<Vec<Stage>> {
    let mut stages = Vec::new();

    for location in tree.files()? {
        let name = location.file_name();
        if name == PIPELINE_FILE {
            stages.extend(load_pipeline(tree, &location)?);
        } else if name.len() > STAGE_FILE_SUFFIX.len() && name.ends_with(STAGE_FILE_SUFFIX) {
            stages.push(load_single_stage(tree, &location)?);
        }
    }

    debug!("Loaded {} stage(s)", stages.len());
    Ok(stages)
}

fn pipeline_error(definition: &FileLocation, message: impl Into<String>) -> Error {
    Error::Pipeline {
        path: definition.to_string(),
        message: message.into(),
    }
}

fn read_definition(tree: &dyn Tree, definition: &FileLocation) -> Result<String> {
    let bytes = tree.read(definition)?;
    String::from_utf8(bytes).map_err(|_| pipeline_error(definition, "file is not valid UTF-8"))
}

fn load_pipeline(tree: &dyn Tree, definition: &FileLocation) -> Result<Vec<Stage>> {
    trace!("Loading pipeline {}", definition);
    let text = read_definition(tree, definition)?;
    let pipeline =
        config::parse_pipeline(&text).map_err(|e| pipeline_error(definition, e.to_string()))?;
    let dir = definition.parent();

    let mut context = Context::new()?;
    // The implicit source is optional: an unreadable file is left out here and
    // reported when it is read as a parameters file.
    let implicit = dir.join(DEFAULT_PARAMS_FILE);
    match loader::load(tree, &implicit) {
        Ok(Some(data)) => add_source(&mut context, definition, VarsSource::file(implicit, data))?,
        Ok(None) => {}
        Err(e) => debug!("Skipping {} as a vars source of {}: {}", implicit, definition, e),
    }
    for entry in pipeline.vars {
        add_vars(&mut context, tree, definition, &dir, entry)?;
    }

    let mut stages = Vec::with_capacity(pipeline.stages.len());
    for (name, stage_def) in pipeline.stages {
        stages.push(build_stage(tree, definition, &dir, &context, name, stage_def)?);
    }
    Ok(stages)
}

fn build_stage(
    tree: &dyn Tree,
    definition: &FileLocation,
    dir: &FileLocation,
    base: &Context,
    name: String,
    stage_def: StageDefinition,
) -> Result<Stage> {
    let mut tracked = TrackedVars::new();
    let interpolation_error = |message: String| Error::Interpolation {
        stage: format!("{}:{}", definition, name),
        message,
    };

    // wdir is resolved before stage vars, which are relative to it
    let wdir = match &stage_def.wdir {
        Some(raw) => dir.join(&base.resolve(raw, &mut tracked).map_err(interpolation_error)?),
        None => dir.clone(),
    };

    let mut context = base.clone();
    for entry in stage_def.vars {
        add_vars(&mut context, tree, definition, &wdir, entry)?;
    }

    let resolve_all = |values: Vec<String>, tracked: &mut TrackedVars| -> Result<Vec<String>> {
        values
            .iter()
            .map(|value| context.resolve(value, tracked).map_err(interpolation_error))
            .collect()
    };

    let cmd = resolve_all(
        stage_def.cmd.map(|cmd| cmd.lines()).unwrap_or_default(),
        &mut tracked,
    )?;
    let deps = resolve_all(flatten_paths(&stage_def.deps), &mut tracked)?;
    let outs = resolve_all(flatten_paths(&stage_def.outs), &mut tracked)?;

    Ok(Stage {
        name,
        definition: definition.clone(),
        kind: StageKind::Pipeline,
        params: params_dependencies(&stage_def.params, &wdir),
        wdir,
        cmd,
        deps,
        outs,
        tracked_vars: tracked,
    })
}

fn load_single_stage(tree: &dyn Tree, definition: &FileLocation) -> Result<Stage> {
    trace!("Loading stage file {}", definition);
    let text = read_definition(tree, definition)?;
    let stage_def =
        config::parse_stage(&text).map_err(|e| pipeline_error(definition, e.to_string()))?;

    let file_name = definition.file_name();
    let name = file_name[..file_name.len() - STAGE_FILE_SUFFIX.len()].to_string();
    let dir = definition.parent();
    let wdir = match &stage_def.wdir {
        Some(raw) => dir.join(raw),
        None => dir,
    };

    Ok(Stage {
        name,
        definition: definition.clone(),
        kind: StageKind::AdHoc,
        params: params_dependencies(&stage_def.params, &wdir),
        wdir,
        cmd: stage_def.cmd.map(|cmd| cmd.lines()).unwrap_or_default(),
        deps: flatten_paths(&stage_def.deps),
        outs: flatten_paths(&stage_def.outs),
        tracked_vars: TrackedVars::new(),
    })
}

fn flatten_paths(entries: &[PathEntry]) -> Vec<String> {
    entries.iter().flat_map(PathEntry::paths).collect()
}

fn add_source(context: &mut Context, definition: &FileLocation, source: VarsSource) -> Result<()> {
    context
        .add(source)
        .map_err(|message| pipeline_error(definition, message))
}

fn add_vars(
    context: &mut Context,
    tree: &dyn Tree,
    definition: &FileLocation,
    base: &FileLocation,
    entry: VarsEntry,
) -> Result<()> {
    let source = match entry {
        VarsEntry::File(path) => {
            let location = base.join(&path);
            if context.contains_file(&location) {
                return Ok(());
            }
            let data = read_vars_file(tree, definition, &location)?;
            VarsSource::file(location, data)
        }
        VarsEntry::Inline(data) => VarsSource::inline(data),
    };
    add_source(context, definition, source)
}

fn read_vars_file(
    tree: &dyn Tree,
    definition: &FileLocation,
    location: &FileLocation,
) -> Result<crate::loader::ParsedContent> {
    match loader::load(tree, location) {
        Ok(Some(data)) => Ok(data),
        Ok(None) => Err(pipeline_error(
            definition,
            format!("vars file '{}' does not exist", location),
        )),
        Err(e) => Err(pipeline_error(definition, e.to_string())),
    }
}

enum KeySelection {
    All,
    Keys(Vec<String>),
}

impl KeySelection {
    fn add_keys(&mut self, keys: Option<&Vec<String>>) {
        match (self, keys) {
            (KeySelection::All, _) => {}
            (this, None) => *this = KeySelection::All,
            (_, Some(keys)) if keys.is_empty() => {}
            (KeySelection::Keys(existing), Some(keys)) => {
                for key in keys {
                    if !existing.contains(key) {
                        existing.push(key.clone());
                    }
                }
            }
        }
    }
}

/// Group a stage's params entries by file, relative to `wdir`.
fn params_dependencies(entries: &[ParamsEntry], wdir: &FileLocation) -> Vec<ParamsDependency> {
    let mut by_file: IndexMap<FileLocation, KeySelection> = IndexMap::new();

    for entry in entries {
        match entry {
            ParamsEntry::Key(key) => {
                by_file
                    .entry(wdir.join(DEFAULT_PARAMS_FILE))
                    .or_insert_with(|| KeySelection::Keys(Vec::new()))
                    .add_keys(Some(&vec![key.clone()]));
            }
            ParamsEntry::Files(files) => {
                for (file, keys) in files {
                    let selection = by_file
                        .entry(wdir.join(file))
                        .or_insert_with(|| KeySelection::Keys(Vec::new()));
                    match keys {
                        Some(keys) if !keys.is_empty() => selection.add_keys(Some(keys)),
                        _ => selection.add_keys(None),
                    }
                }
            }
        }
    }

    by_file
        .into_iter()
        .map(|(location, selection)| match selection {
            KeySelection::All => ParamsDependency::new(location, Vec::new()),
            KeySelection::Keys(keys) => ParamsDependency::new(location, keys),
        })
        .collect()
}
