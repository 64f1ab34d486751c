//! # Error Handling
//!
//! This module defines the centralized error type for `repo-params`. It uses
//! `thiserror` to describe every failure mode of the library with enough
//! context to tell the user which file, stage, or revision is at fault.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum that represents all possible errors that can
//!   occur within the library.
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Most variants never reach the user during a normal `show`: unreadable or
//! malformed parameter files are reported through the diagnostic observer and
//! skipped. The only fatal outcome of a healthy aggregation is
//! [`Error::NoParams`].

use thiserror::Error;

use crate::loader::ParseError;

/// Main error type for repo-params operations
#[derive(Error, Debug)]
pub enum Error {
    /// No snapshot produced any parameters.
    #[error("no parameter configs files in this repository")]
    NoParams,

    /// A parameters file could not be parsed.
    #[error("Failed to parse '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: ParseError,
    },

    /// The file suffix does not map to any supported format.
    #[error("Unsupported parameters file format '{suffix}' for '{path}'")]
    UnsupportedFormat { path: String, suffix: String },

    /// A pipeline or stage definition file is malformed.
    #[error("Pipeline definition error in '{path}': {message}")]
    Pipeline { path: String, message: String },

    /// A `${...}` reference in a stage could not be resolved.
    #[error("Interpolation error in stage '{stage}': {message}")]
    Interpolation { stage: String, message: String },

    /// An error occurred while executing a Git command.
    #[error("Git command failed: {command} - {stderr}")]
    GitCommand { command: String, stderr: String },

    /// Revisions were requested for a directory that is not a Git repository.
    #[error("Not a git repository: {path}")]
    NotARepository { path: String },

    /// A requested revision does not exist.
    #[error("Unknown revision: {rev}")]
    UnknownRevision { rev: String },

    /// An error occurred while reading a snapshot tree.
    #[error("Filesystem operation error: {message}")]
    Filesystem { message: String },

    /// An error occurred with a path-related operation.
    #[error("Path operation error: {message}")]
    Path { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON serialization error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
