//! Default values for repo-params.
//!
//! This module provides centralized default names used across the library
//! and the CLI, ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// Parameters file consulted when no explicit targets are given, relative to
/// the repository root. Pipelines also read it implicitly as a vars source.
pub const DEFAULT_PARAMS_FILE: &str = "params.yaml";

/// File name of pipeline definitions.
pub const PIPELINE_FILE: &str = "pipeline.yaml";

/// Suffix of single-stage definition files.
pub const STAGE_FILE_SUFFIX: &str = ".stage.yaml";

/// Snapshot identifier of the live working copy.
pub const WORKSPACE: &str = "workspace";

/// Environment variable overriding the repository root.
pub const ROOT_ENV_VAR: &str = "REPO_PARAMS_ROOT";

/// Returns the default repository root: the current directory.
///
/// Falls back to `.` if the current directory cannot be determined.
pub fn default_repo_root() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
