//! Path manipulation utilities for repo-params
//!
//! Parameter files are identified by [`FileLocation`], a normalized,
//! repository-root-relative path that always uses `/` as separator. The same
//! file therefore gets the same key no matter which stage declared it or
//! which snapshot it was read from.

use std::fmt;

use glob::Pattern;
use serde::Serialize;

use crate::error::{Error, Result};

/// Match a path against a glob pattern
pub fn glob_match(pattern: &str, path: &str) -> Result<bool> {
    let pattern = Pattern::new(pattern).map_err(Error::Glob)?;
    Ok(pattern.matches(path))
}

/// Whether a string contains glob metacharacters
pub fn is_glob(value: &str) -> bool {
    value.contains(['*', '?', '['])
}

/// Normalize a path to `/`-separated form without `.` or empty segments.
///
/// `..` removes the preceding segment when there is one; leading `..`
/// segments of a relative path are kept. A leading `/` is preserved and `..`
/// directly under it is dropped.
pub fn normalize(path: &str) -> String {
    let path = path.replace('\\', "/");
    let absolute = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if absolute => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if absolute {
        format!("/{}", joined)
    } else {
        joined
    }
}

/// A normalized file or directory location inside a repository snapshot.
///
/// The empty location denotes the repository root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct FileLocation(String);

impl FileLocation {
    /// Create a location from any path string, normalizing it.
    pub fn new(path: impl AsRef<str>) -> Self {
        Self(normalize(path.as_ref()))
    }

    /// The repository root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Resolve `relative` against this location, treated as a directory.
    pub fn join(&self, relative: &str) -> Self {
        if relative.starts_with('/') || self.0.is_empty() {
            return Self::new(relative);
        }
        Self::new(format!("{}/{}", self.0, relative))
    }

    /// The directory containing this location.
    pub fn parent(&self) -> Self {
        match self.0.rfind('/') {
            Some(0) => Self("/".to_string()),
            Some(idx) => Self(self.0[..idx].to_string()),
            None => Self::root(),
        }
    }

    /// The final path component.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }

    /// The lowercased extension including its dot, e.g. `.yaml`.
    ///
    /// Dot-files such as `.env` have no suffix.
    pub fn suffix(&self) -> Option<String> {
        let name = self.file_name();
        name.rfind('.')
            .filter(|&idx| idx > 0 && idx + 1 < name.len())
            .map(|idx| name[idx..].to_lowercase())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileLocation {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl AsRef<str> for FileLocation {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
