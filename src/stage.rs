//! Pipeline stages and their parameter dependencies

use std::collections::BTreeMap;

use crate::content::{insert_path, lookup};
use crate::error::Result;
use crate::filesystem::Tree;
use crate::loader::{self, ParsedContent};
use crate::path::FileLocation;

/// Variables a stage consumed during interpolation, by originating file.
pub type TrackedVars = BTreeMap<FileLocation, ParsedContent>;

/// How a stage was defined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    /// Declared inside a `pipeline.yaml`.
    Pipeline,
    /// Declared on its own in a `*.stage.yaml` file.
    AdHoc,
}

/// A stage's declared dependency on a parameters file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamsDependency {
    pub location: FileLocation,
    /// Dotted keys the stage uses; empty means the whole file.
    pub keys: Vec<String>,
}

impl ParamsDependency {
    pub fn new(location: FileLocation, keys: Vec<String>) -> Self {
        Self { location, keys }
    }

    /// Read the declared parameters from `tree`.
    ///
    /// A missing file reads as empty and missing keys are left out. Selected
    /// keys are nested back under their path.
    pub fn read_params(&self, tree: &dyn Tree) -> Result<ParsedContent> {
        let Some(content) = loader::load(tree, &self.location)? else {
            return Ok(ParsedContent::new());
        };
        if self.keys.is_empty() {
            return Ok(content);
        }

        let mut selected = ParsedContent::new();
        for key in &self.keys {
            if let Some(value) = lookup(&content, key) {
                insert_path(&mut selected, key, value.clone());
            }
        }
        Ok(selected)
    }
}

/// A single stage of the pipeline as seen in one snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    pub name: String,
    /// File the stage was defined in.
    pub definition: FileLocation,
    pub kind: StageKind,
    pub wdir: FileLocation,
    pub cmd: Vec<String>,
    pub deps: Vec<String>,
    pub outs: Vec<String>,
    pub params: Vec<ParamsDependency>,
    pub tracked_vars: TrackedVars,
}

impl Stage {
    /// `<definition file>:<name>`, unique within a snapshot.
    pub fn address(&self) -> String {
        format!("{}:{}", self.definition, self.name)
    }

    pub fn is_pipeline(&self) -> bool {
        self.kind == StageKind::Pipeline
    }
}
