//! Read-only views of a repository snapshot
//!
//! A [`Tree`] is everything the params core needs from a snapshot: existence
//! checks, file reads and a file listing for pipeline discovery. The
//! working copy is served by [`WorkTree`], historical revisions by
//! `repository::RevisionTree`, and [`MemoryFS`] keeps snapshots in memory for
//! embedding and tests.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::path::FileLocation;

/// Read access to the files of one snapshot
pub trait Tree {
    /// Check if a file exists
    fn exists(&self, location: &FileLocation) -> bool;

    /// Read the full content of a file
    fn read(&self, location: &FileLocation) -> Result<Vec<u8>>;

    /// List every file in the snapshot
    fn files(&self) -> Result<Vec<FileLocation>>;
}

/// In-memory filesystem snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryFS {
    /// Files stored as location -> content mapping
    files: BTreeMap<FileLocation, Vec<u8>>,
}

impl MemoryFS {
    /// Create a new empty filesystem
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or update a file
    pub fn add_file(&mut self, path: impl AsRef<str>, content: Vec<u8>) -> Result<()> {
        let location = FileLocation::new(path);
        if location.is_root() {
            return Err(Error::Filesystem {
                message: "cannot store a file at the repository root".to_string(),
            });
        }
        self.files.insert(location, content);
        Ok(())
    }

    /// Add a file with string content
    pub fn add_file_string(&mut self, path: impl AsRef<str>, content: &str) -> Result<()> {
        self.add_file(path, content.as_bytes().to_vec())
    }

    /// Builder-style variant of [`MemoryFS::add_file_string`]
    pub fn with_file(mut self, path: impl AsRef<str>, content: &str) -> Result<Self> {
        self.add_file_string(path, content)?;
        Ok(self)
    }

    /// Remove a file
    pub fn remove_file(&mut self, path: impl AsRef<str>) -> Option<Vec<u8>> {
        self.files.remove(&FileLocation::new(path))
    }

    /// Get the number of files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if filesystem is empty
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl Tree for MemoryFS {
    fn exists(&self, location: &FileLocation) -> bool {
        self.files.contains_key(location)
    }

    fn read(&self, location: &FileLocation) -> Result<Vec<u8>> {
        self.files
            .get(location)
            .cloned()
            .ok_or_else(|| Error::Filesystem {
                message: format!("File not found: {}", location),
            })
    }

    fn files(&self) -> Result<Vec<FileLocation>> {
        Ok(self.files.keys().cloned().collect())
    }
}

/// The live working copy of a repository on disk
#[derive(Debug, Clone)]
pub struct WorkTree {
    root: PathBuf,
}

impl WorkTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, location: &FileLocation) -> PathBuf {
        self.root.join(location.as_str())
    }
}

impl Tree for WorkTree {
    fn exists(&self, location: &FileLocation) -> bool {
        self.full_path(location).is_file()
    }

    fn read(&self, location: &FileLocation) -> Result<Vec<u8>> {
        Ok(fs::read(self.full_path(location))?)
    }

    fn files(&self) -> Result<Vec<FileLocation>> {
        let mut files = Vec::new();
        // Skip .git directory
        let walker = WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || entry.file_name() != ".git");

        for entry in walker {
            let entry = entry.map_err(|err| Error::Filesystem {
                message: format!("Failed to walk {}: {}", self.root.display(), err),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .map_err(|err| Error::Path {
                    message: err.to_string(),
                })?;
            files.push(FileLocation::new(relative.to_string_lossy()));
        }

        files.sort();
        Ok(files)
    }
}
