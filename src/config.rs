//! # Pipeline Definition Schema
//!
//! This module defines the data structures behind the two kinds of stage
//! definition files found in a snapshot, and the logic for parsing them.
//!
//! ## Key Components
//!
//! - **`PipelineDefinition`**: the contents of a `pipeline.yaml`. Carries a
//!   list of `vars` sources shared by every stage and an ordered mapping of
//!   stage name to `StageDefinition`.
//!
//! - **`StageDefinition`**: one stage. Its `cmd`, `wdir`, `deps` and `outs`
//!   may contain `${...}` references that are resolved later against the vars
//!   context. Single-stage `*.stage.yaml` files contain exactly one
//!   `StageDefinition` at the top level.
//!
//! - **`ParamsEntry`**: one item of a stage's `params` list. Either a bare key
//!   looked up in the default parameters file, or a mapping of file name to an
//!   optional key list:
//!
//! ```yaml
//! params:
//!   - lr                      # key in <wdir>/params.yaml
//!   - config/train.toml:      # whole file
//!   - config/model.json:
//!       - layers
//!       - dropout
//! ```
//!
//! Keys not described here (`frozen`, `desc`, `metrics` ...) are accepted and
//! ignored.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Contents of a `pipeline.yaml` file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineDefinition {
    /// Variable sources shared by every stage of the file, in precedence order.
    #[serde(default)]
    pub vars: Vec<VarsEntry>,
    /// Stages in declaration order.
    #[serde(default)]
    pub stages: IndexMap<String, StageDefinition>,
}

/// A single stage definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageDefinition {
    #[serde(default)]
    pub cmd: Option<Command>,
    /// Working directory relative to the definition file.
    #[serde(default)]
    pub wdir: Option<String>,
    #[serde(default)]
    pub deps: Vec<PathEntry>,
    #[serde(default)]
    pub outs: Vec<PathEntry>,
    #[serde(default)]
    pub params: Vec<ParamsEntry>,
    /// Stage-local variable sources, layered over the file-level ones.
    #[serde(default)]
    pub vars: Vec<VarsEntry>,
}

/// A stage command: one line or several
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Command {
    Single(String),
    Multiple(Vec<String>),
}

impl Command {
    pub fn lines(&self) -> Vec<String> {
        match self {
            Command::Single(line) => vec![line.clone()],
            Command::Multiple(lines) => lines.clone(),
        }
    }
}

/// A dependency or output path, optionally with per-path options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathEntry {
    Path(String),
    WithOptions(IndexMap<String, serde_yaml::Value>),
}

impl PathEntry {
    pub fn paths(&self) -> Vec<String> {
        match self {
            PathEntry::Path(path) => vec![path.clone()],
            PathEntry::WithOptions(map) => map.keys().cloned().collect(),
        }
    }
}

/// One entry of a stage's `params` list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamsEntry {
    /// A key in the default parameters file of the stage's working directory.
    Key(String),
    /// File name to key list; `null` or an empty list selects the whole file.
    Files(IndexMap<String, Option<Vec<String>>>),
}

/// One entry of a `vars` list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VarsEntry {
    /// Path of a parameters file, relative to the defining directory.
    File(String),
    /// Values given inline.
    Inline(Map<String, Value>),
}

/// Parses the contents of a `pipeline.yaml` file.
///
/// An empty document is an empty pipeline.
pub fn parse_pipeline(yaml_content: &str) -> Result<PipelineDefinition> {
    if yaml_content.trim().is_empty() {
        return Ok(PipelineDefinition::default());
    }
    serde_yaml::from_str(yaml_content).map_err(Error::Yaml)
}

/// Parses the contents of a single-stage `*.stage.yaml` file.
pub fn parse_stage(yaml_content: &str) -> Result<StageDefinition> {
    if yaml_content.trim().is_empty() {
        return Ok(StageDefinition::default());
    }
    serde_yaml::from_str(yaml_content).map_err(Error::Yaml)
}
