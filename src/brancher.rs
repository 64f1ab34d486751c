//! # Snapshot Enumeration
//!
//! A [`Brancher`] yields the snapshots a params query covers: the working
//! copy first, then any requested revisions. Reading a snapshot is a scoped
//! acquisition: [`with_snapshot`] enters it, hands its [`Tree`] to a closure
//! and always leaves it again, whether the closure succeeds, fails, or
//! unwinds. Only one snapshot is ever entered at a time.
//!
//! Two implementations ship with the crate:
//!
//! - [`RepoBrancher`] enumerates a [`Repo`]'s working copy and Git revisions.
//!   Revisions resolving to the same commit are visited once, under a
//!   [`SnapshotId`] that joins their names with `,`.
//! - [`MemoryBrancher`] serves [`MemoryFS`] snapshots.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use log::debug;
use serde::{Serialize, Serializer};

use crate::defaults::WORKSPACE;
use crate::error::{Error, Result};
use crate::filesystem::{MemoryFS, Tree};
use crate::path::FileLocation;
use crate::repository::{Repo, RevisionTree};

/// Identifies one snapshot of the repository.
///
/// Equality, ordering and hashing use the display id only, so a result map
/// keyed by `SnapshotId` can be indexed with a plain `&str`.
#[derive(Debug, Clone)]
pub struct SnapshotId {
    id: String,
    names: Vec<String>,
}

impl SnapshotId {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            names: vec![id.clone()],
            id,
        }
    }

    /// The live working copy sentinel.
    pub fn workspace() -> Self {
        Self::new(WORKSPACE)
    }

    /// Identifier for a group of revision names pointing at one commit.
    ///
    /// The names are kept as given; the display id joins them with `,`.
    pub fn from_names(names: &[String]) -> Self {
        Self {
            id: names.join(","),
            names: names.to_vec(),
        }
    }

    pub fn is_workspace(&self) -> bool {
        self.id == WORKSPACE
    }

    /// The revision names this snapshot was requested under.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn as_str(&self) -> &str {
        &self.id
    }
}

impl PartialEq for SnapshotId {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SnapshotId {}

impl Hash for SnapshotId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for SnapshotId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SnapshotId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Serialize for SnapshotId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.id)
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl From<&str> for SnapshotId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SnapshotId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl Borrow<str> for SnapshotId {
    fn borrow(&self) -> &str {
        &self.id
    }
}

/// Why the active snapshot cannot be determined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableReason {
    /// HEAD does not point at a branch.
    Detached,
    /// There is no version control context.
    NoRepository,
}

/// The currently checked-out snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveSnapshot {
    Resolved(String),
    Unavailable(UnavailableReason),
}

/// Enumerates snapshots and provides scoped access to their files.
pub trait Brancher {
    /// All snapshots to visit, the working copy first.
    fn snapshots(&self) -> Result<Vec<SnapshotId>>;

    /// Make a snapshot readable.
    ///
    /// Callers must pair every successful `enter` with [`Brancher::leave`];
    /// use [`with_snapshot`] rather than calling this directly.
    fn enter(&self, id: &SnapshotId) -> Result<Box<dyn Tree + '_>>;

    /// Release a snapshot previously entered.
    fn leave(&self, _id: &SnapshotId) {}

    fn active_snapshot(&self) -> ActiveSnapshot;
}

/// Calls [`Brancher::leave`] when dropped.
struct Entered<'a> {
    brancher: &'a dyn Brancher,
    id: &'a SnapshotId,
    tree: Box<dyn Tree + 'a>,
}

impl Drop for Entered<'_> {
    fn drop(&mut self) {
        self.brancher.leave(self.id);
    }
}

/// Run `f` against the files of snapshot `id`, leaving it on every exit path.
pub fn with_snapshot<'a, T>(
    brancher: &'a dyn Brancher,
    id: &'a SnapshotId,
    f: impl FnOnce(&dyn Tree) -> Result<T>,
) -> Result<T> {
    let entered = Entered {
        brancher,
        id,
        tree: brancher.enter(id)?,
    };
    f(entered.tree.as_ref())
}

impl<T: Tree + ?Sized> Tree for &T {
    fn exists(&self, location: &FileLocation) -> bool {
        (**self).exists(location)
    }

    fn read(&self, location: &FileLocation) -> Result<Vec<u8>> {
        (**self).read(location)
    }

    fn files(&self) -> Result<Vec<FileLocation>> {
        (**self).files()
    }
}

/// Which revisions to visit besides the working copy
#[derive(Debug, Clone, Default)]
pub struct RevSelection {
    pub revs: Vec<String>,
    pub all_branches: bool,
    pub all_tags: bool,
    pub all_commits: bool,
}

impl RevSelection {
    pub fn revs<I, S>(revs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            revs: revs.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    fn wants_all_refs(&self) -> bool {
        self.all_branches || self.all_tags || self.all_commits
    }
}

/// Enumerates the working copy and Git revisions of a [`Repo`].
pub struct RepoBrancher<'a> {
    repo: &'a Repo,
    selection: RevSelection,
}

impl<'a> RepoBrancher<'a> {
    pub fn new(repo: &'a Repo, selection: RevSelection) -> Self {
        Self { repo, selection }
    }
}

impl Brancher for RepoBrancher<'_> {
    fn snapshots(&self) -> Result<Vec<SnapshotId>> {
        let mut ids = vec![SnapshotId::workspace()];
        let names: Vec<String> = self
            .selection
            .revs
            .iter()
            .filter(|rev| rev.as_str() != WORKSPACE)
            .cloned()
            .collect();

        if names.is_empty() && !self.selection.wants_all_refs() {
            return Ok(ids);
        }
        let scm = self.repo.scm()?;

        let mut names = names;
        if self.selection.all_branches {
            names.extend(scm.list_branches()?);
        }
        if self.selection.all_tags {
            names.extend(scm.list_tags()?);
        }
        if self.selection.all_commits {
            names.extend(scm.list_commits()?);
        }

        let mut by_commit: IndexMap<String, Vec<String>> = IndexMap::new();
        for name in names {
            let commit = scm.resolve_revision(&name)?;
            let group = by_commit.entry(commit).or_default();
            if !group.contains(&name) {
                group.push(name);
            }
        }

        ids.extend(by_commit.values().map(|names| SnapshotId::from_names(names)));
        Ok(ids)
    }

    fn enter(&self, id: &SnapshotId) -> Result<Box<dyn Tree + '_>> {
        if id.is_workspace() {
            return Ok(Box::new(self.repo.work_tree()));
        }
        let scm = self.repo.scm()?;
        let name = id.names().next().unwrap_or_default();
        let commit = scm.resolve_revision(name)?;
        debug!("entering snapshot {} ({})", id, commit);
        Ok(Box::new(RevisionTree::open(scm, &commit)?))
    }

    fn leave(&self, id: &SnapshotId) {
        debug!("leaving snapshot {}", id);
    }

    fn active_snapshot(&self) -> ActiveSnapshot {
        self.repo.active_snapshot()
    }
}

/// Serves in-memory snapshots, the working copy first.
#[derive(Debug, Clone)]
pub struct MemoryBrancher {
    snapshots: IndexMap<SnapshotId, MemoryFS>,
    active: ActiveSnapshot,
}

impl MemoryBrancher {
    /// Start with the working copy; there is no active branch until one is set.
    pub fn new(workspace: MemoryFS) -> Self {
        let mut snapshots = IndexMap::new();
        snapshots.insert(SnapshotId::workspace(), workspace);
        Self {
            snapshots,
            active: ActiveSnapshot::Unavailable(UnavailableReason::NoRepository),
        }
    }

    /// Add (or replace) a named snapshot.
    pub fn snapshot(mut self, id: impl Into<SnapshotId>, fs: MemoryFS) -> Self {
        self.snapshots.insert(id.into(), fs);
        self
    }

    /// Mark a branch as checked out.
    pub fn active(mut self, branch: &str) -> Self {
        self.active = ActiveSnapshot::Resolved(branch.to_string());
        self
    }

    /// Set the active snapshot state explicitly.
    pub fn active_state(mut self, active: ActiveSnapshot) -> Self {
        self.active = active;
        self
    }
}

impl Brancher for MemoryBrancher {
    fn snapshots(&self) -> Result<Vec<SnapshotId>> {
        Ok(self.snapshots.keys().cloned().collect())
    }

    fn enter(&self, id: &SnapshotId) -> Result<Box<dyn Tree + '_>> {
        self.snapshots
            .get(id)
            .map(|fs| Box::new(fs) as Box<dyn Tree + '_>)
            .ok_or_else(|| Error::UnknownRevision {
                rev: id.to_string(),
            })
    }

    fn active_snapshot(&self) -> ActiveSnapshot {
        self.active.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::tests::MockScm;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Wraps a brancher and records enter/leave calls.
    struct Recording<B> {
        inner: B,
        events: RefCell<Vec<String>>,
    }

    impl<B: Brancher> Brancher for Recording<B> {
        fn snapshots(&self) -> Result<Vec<SnapshotId>> {
            self.inner.snapshots()
        }

        fn enter(&self, id: &SnapshotId) -> Result<Box<dyn Tree + '_>> {
            self.events.borrow_mut().push(format!("enter {}", id));
            self.inner.enter(id)
        }

        fn leave(&self, id: &SnapshotId) {
            self.events.borrow_mut().push(format!("leave {}", id));
        }

        fn active_snapshot(&self) -> ActiveSnapshot {
            self.inner.active_snapshot()
        }
    }

    fn recording() -> Recording<MemoryBrancher> {
        let workspace = MemoryFS::new().with_file("params.yaml", "lr: 0.1").unwrap();
        Recording {
            inner: MemoryBrancher::new(workspace).snapshot("main", MemoryFS::new()),
            events: RefCell::new(Vec::new()),
        }
    }

    #[test]
    fn test_snapshot_id_names() {
        let id = SnapshotId::from_names(&["main".to_string(), "v1.0".to_string()]);
        assert_eq!(id.as_str(), "main,v1.0");
        assert_eq!(id.names().collect::<Vec<_>>(), vec!["main", "v1.0"]);
        assert!(!id.is_workspace());
        assert!(SnapshotId::workspace().is_workspace());
    }

    #[test]
    fn test_snapshot_id_keeps_names_containing_commas() {
        let id = SnapshotId::from_names(&["feature,x".to_string(), "v2".to_string()]);
        assert_eq!(id.names().collect::<Vec<_>>(), vec!["feature,x", "v2"]);
        assert!(!id.names().any(|name| name == "feature"));
        assert_eq!(SnapshotId::new("a,b").names().count(), 1);
    }

    #[test]
    fn test_with_snapshot_leaves_on_success() {
        let brancher = recording();
        let id = SnapshotId::workspace();
        let exists = with_snapshot(&brancher, &id, |tree| Ok(tree.exists(&"params.yaml".into())))
            .unwrap();
        assert!(exists);
        assert_eq!(
            *brancher.events.borrow(),
            vec!["enter workspace", "leave workspace"]
        );
    }

    #[test]
    fn test_with_snapshot_leaves_on_error() {
        let brancher = recording();
        let id = SnapshotId::new("main");
        let result: Result<()> = with_snapshot(&brancher, &id, |_| Err(Error::NoParams));
        assert!(result.is_err());
        assert_eq!(*brancher.events.borrow(), vec!["enter main", "leave main"]);
    }

    #[test]
    fn test_with_snapshot_leaves_on_panic() {
        let brancher = recording();
        let id = SnapshotId::new("main");
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _: Result<()> = with_snapshot(&brancher, &id, |_| panic!("boom"));
        }));
        assert!(outcome.is_err());
        assert_eq!(*brancher.events.borrow(), vec!["enter main", "leave main"]);
    }

    #[test]
    fn test_with_snapshot_failed_enter_does_not_leave() {
        let brancher = recording();
        let id = SnapshotId::new("missing");
        let result = with_snapshot(&brancher, &id, |_| Ok(()));
        assert!(matches!(result, Err(Error::UnknownRevision { .. })));
        assert_eq!(*brancher.events.borrow(), vec!["enter missing"]);
    }

    #[test]
    fn test_memory_brancher_order_and_active() {
        let brancher = MemoryBrancher::new(MemoryFS::new())
            .snapshot("main", MemoryFS::new())
            .snapshot("dev", MemoryFS::new())
            .active("main");
        let ids: Vec<String> = brancher
            .snapshots()
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(ids, vec!["workspace", "main", "dev"]);
        assert_eq!(
            brancher.active_snapshot(),
            ActiveSnapshot::Resolved("main".to_string())
        );
    }

    fn mock_repo() -> Repo {
        let mut refs = HashMap::new();
        refs.insert("main".to_string(), "c1".to_string());
        refs.insert("v1.0".to_string(), "c1".to_string());
        refs.insert("dev".to_string(), "c2".to_string());
        refs.insert("c1".to_string(), "c1".to_string());
        refs.insert("c2".to_string(), "c2".to_string());
        let mut files = HashMap::new();
        files.insert(
            "c1".to_string(),
            vec![("params.yaml".to_string(), "lr: 0.1".to_string())],
        );
        let scm = MockScm {
            refs,
            branches: vec!["dev".to_string(), "main".to_string()],
            tags: vec!["v1.0".to_string()],
            commits: vec!["c2".to_string(), "c1".to_string()],
            active: Some("main".to_string()),
            files,
        };
        Repo::with_scm("/nonexistent", Some(Box::new(scm)))
    }

    #[test]
    fn test_repo_brancher_workspace_only() {
        let repo = Repo::with_scm("/nonexistent", None);
        let brancher = RepoBrancher::new(&repo, RevSelection::default());
        assert_eq!(brancher.snapshots().unwrap(), vec![SnapshotId::workspace()]);
    }

    #[test]
    fn test_repo_brancher_revs_require_scm() {
        let repo = Repo::with_scm("/nonexistent", None);
        let brancher = RepoBrancher::new(&repo, RevSelection::revs(["main"]));
        assert!(matches!(
            brancher.snapshots(),
            Err(Error::NotARepository { .. })
        ));
    }

    #[test]
    fn test_repo_brancher_groups_by_commit() {
        let repo = mock_repo();
        let brancher = RepoBrancher::new(&repo, RevSelection::revs(["main", "dev", "v1.0", "workspace"]));
        let ids: Vec<String> = brancher
            .snapshots()
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(ids, vec!["workspace", "main,v1.0", "dev"]);
    }

    #[test]
    fn test_repo_brancher_all_refs() {
        let repo = mock_repo();
        let selection = RevSelection {
            all_branches: true,
            all_tags: true,
            all_commits: true,
            ..Default::default()
        };
        let brancher = RepoBrancher::new(&repo, selection);
        let ids: Vec<String> = brancher
            .snapshots()
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(ids, vec!["workspace", "dev,c2", "main,v1.0,c1"]);
    }

    #[test]
    fn test_repo_brancher_unknown_revision() {
        let repo = mock_repo();
        let brancher = RepoBrancher::new(&repo, RevSelection::revs(["nope"]));
        assert!(matches!(
            brancher.snapshots(),
            Err(Error::UnknownRevision { .. })
        ));
    }

    #[test]
    fn test_repo_brancher_enters_revision() {
        let repo = mock_repo();
        let brancher = RepoBrancher::new(&repo, RevSelection::revs(["main"]));
        let id = SnapshotId::from_names(&["main".to_string(), "v1.0".to_string()]);
        let content = with_snapshot(&brancher, &id, |tree| tree.read(&"params.yaml".into())).unwrap();
        assert_eq!(content, b"lr: 0.1");
        assert_eq!(
            brancher.active_snapshot(),
            ActiveSnapshot::Resolved("main".to_string())
        );
    }
}
