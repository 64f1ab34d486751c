//! # Repository Access
//!
//! This module provides [`Repo`], the handle for a parameters repository on
//! disk, and [`RevisionTree`], a read-only [`Tree`] over one historical
//! commit.
//!
//! ## Design
//!
//! Version control access goes through the [`ScmOperations`] trait so the
//! rest of the crate never shells out directly. [`DefaultScmOperations`]
//! wraps the system `git` command; tests can inject their own
//! implementation with [`Repo::with_scm`]. A directory that is not a Git
//! repository still works: it only has the working copy snapshot and its
//! active snapshot is [`UnavailableReason::NoRepository`].

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use log::debug;

use crate::brancher::{ActiveSnapshot, UnavailableReason};
use crate::error::{Error, Result};
use crate::filesystem::{Tree, WorkTree};
use crate::path::FileLocation;

/// Trait for version control operations - allows mocking in tests
pub trait ScmOperations {
    /// Resolve a revision name to a commit id.
    fn resolve_revision(&self, rev: &str) -> Result<String>;

    /// Retrieves all local branch names.
    fn list_branches(&self) -> Result<Vec<String>>;

    /// Retrieves all tag names.
    fn list_tags(&self) -> Result<Vec<String>>;

    /// Retrieves every commit reachable from any ref.
    fn list_commits(&self) -> Result<Vec<String>>;

    /// The checked-out branch, or why there is none.
    fn active_branch(&self) -> ActiveSnapshot;

    /// All file paths of a commit.
    fn list_files(&self, rev: &str) -> Result<Vec<String>>;

    /// Content of one file at a commit.
    fn read_file(&self, rev: &str, path: &str) -> Result<Vec<u8>>;
}

/// The default implementation of `ScmOperations`, which uses the system's
/// `git` command.
///
/// When `root` is a subdirectory of the work tree, commit paths are
/// reported relative to `root` and files outside it are not listed.
pub struct DefaultScmOperations {
    root: PathBuf,
    prefix: String,
}

impl DefaultScmOperations {
    pub fn new(root: PathBuf) -> Result<Self> {
        let prefix = crate::git::show_prefix(&root)?;
        Ok(Self { root, prefix })
    }
}

/// Paths under `prefix`, with the prefix removed.
fn relative_to_prefix(paths: Vec<String>, prefix: &str) -> Vec<String> {
    if prefix.is_empty() {
        return paths;
    }
    paths
        .into_iter()
        .filter_map(|path| path.strip_prefix(prefix).map(str::to_string))
        .collect()
}

impl ScmOperations for DefaultScmOperations {
    fn resolve_revision(&self, rev: &str) -> Result<String> {
        crate::git::resolve_revision(&self.root, rev)
    }

    fn list_branches(&self) -> Result<Vec<String>> {
        crate::git::list_branches(&self.root)
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        crate::git::list_tags(&self.root)
    }

    fn list_commits(&self) -> Result<Vec<String>> {
        crate::git::list_commits(&self.root)
    }

    fn active_branch(&self) -> ActiveSnapshot {
        match crate::git::current_branch(&self.root) {
            Ok(Some(branch)) => ActiveSnapshot::Resolved(branch),
            Ok(None) => ActiveSnapshot::Unavailable(UnavailableReason::Detached),
            Err(err) => {
                debug!("cannot determine active branch: {}", err);
                ActiveSnapshot::Unavailable(UnavailableReason::NoRepository)
            }
        }
    }

    fn list_files(&self, rev: &str) -> Result<Vec<String>> {
        let paths = crate::git::list_files(&self.root, rev)?;
        Ok(relative_to_prefix(paths, &self.prefix))
    }

    fn read_file(&self, rev: &str, path: &str) -> Result<Vec<u8>> {
        crate::git::show_file(&self.root, rev, &format!("{}{}", self.prefix, path))
    }
}

/// A parameters repository: a working copy plus optional version control.
pub struct Repo {
    root: PathBuf,
    scm: Option<Box<dyn ScmOperations>>,
}

impl Repo {
    /// Open the repository rooted at `root`.
    ///
    /// Version control is enabled when `root` is inside a Git work tree.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::Path {
                message: format!("Repository root is not a directory: {}", root.display()),
            });
        }
        let scm: Option<Box<dyn ScmOperations>> = if crate::git::is_repository(&root) {
            Some(Box::new(DefaultScmOperations::new(root.clone())?))
        } else {
            debug!("{} is not a git repository", root.display());
            None
        };
        Ok(Self { root, scm })
    }

    /// Creates a `Repo` with a custom (or no) `ScmOperations` implementation.
    pub fn with_scm(root: impl Into<PathBuf>, scm: Option<Box<dyn ScmOperations>>) -> Self {
        Self {
            root: root.into(),
            scm,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn has_scm(&self) -> bool {
        self.scm.is_some()
    }

    /// Version control access, failing when the repository has none.
    pub fn scm(&self) -> Result<&dyn ScmOperations> {
        self.scm.as_deref().ok_or_else(|| Error::NotARepository {
            path: self.root.display().to_string(),
        })
    }

    pub fn work_tree(&self) -> WorkTree {
        WorkTree::new(&self.root)
    }

    pub fn active_snapshot(&self) -> ActiveSnapshot {
        match &self.scm {
            Some(scm) => scm.active_branch(),
            None => ActiveSnapshot::Unavailable(UnavailableReason::NoRepository),
        }
    }
}

/// Read-only view of the files of one commit.
///
/// The file listing is fetched once when the tree is opened; contents are
/// read on demand.
pub struct RevisionTree<'a> {
    scm: &'a dyn ScmOperations,
    rev: String,
    files: BTreeSet<FileLocation>,
}

impl<'a> RevisionTree<'a> {
    pub fn open(scm: &'a dyn ScmOperations, rev: &str) -> Result<Self> {
        let files = scm
            .list_files(rev)?
            .into_iter()
            .map(FileLocation::new)
            .collect();
        Ok(Self {
            scm,
            rev: rev.to_string(),
            files,
        })
    }

    pub fn rev(&self) -> &str {
        &self.rev
    }
}

impl Tree for RevisionTree<'_> {
    fn exists(&self, location: &FileLocation) -> bool {
        self.files.contains(location)
    }

    fn read(&self, location: &FileLocation) -> Result<Vec<u8>> {
        if !self.exists(location) {
            return Err(Error::Filesystem {
                message: format!("File not found at {}: {}", self.rev, location),
            });
        }
        self.scm.read_file(&self.rev, location.as_str())
    }

    fn files(&self) -> Result<Vec<FileLocation>> {
        Ok(self.files.iter().cloned().collect())
    }
}
