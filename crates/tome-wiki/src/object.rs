//! Behaviour shared by pages and trees.

use std::fmt;
use std::sync::Arc;

use tome_repo::{Commit, PathDiff, Snapshot, VersionBackend};

use crate::error::WikiResult;
use crate::history::HistoryCache;
use crate::page::Page;
use crate::path;
use crate::tree::Tree;

/// State common to every versioned object.
#[derive(Clone)]
pub struct ObjectBase {
    pub(crate) repo: Arc<dyn VersionBackend>,
    pub(crate) path: String,
    pub(crate) snapshot: Option<Snapshot>,
    pub(crate) commit: Option<Commit>,
    pub(crate) current: bool,
    pub(crate) history: HistoryCache,
}

impl ObjectBase {
    /// `path` must already be normalized and validated.
    pub(crate) fn new(
        repo: Arc<dyn VersionBackend>,
        path: String,
        snapshot: Option<Snapshot>,
        commit: Option<Commit>,
        current: bool,
    ) -> Self {
        Self {
            repo,
            path,
            snapshot,
            commit,
            current,
            history: HistoryCache::default(),
        }
    }
}

impl fmt::Debug for ObjectBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectBase")
            .field("path", &self.path)
            .field("snapshot", &self.snapshot)
            .field("commit", &self.commit.as_ref().map(|c| c.id))
            .field("current", &self.current)
            .finish()
    }
}

/// A path in the wiki bound to an optional snapshot and commit.
pub trait ContentObject {
    fn base(&self) -> &ObjectBase;

    fn repository(&self) -> &Arc<dyn VersionBackend> {
        &self.base().repo
    }

    fn path(&self) -> &str {
        &self.base().path
    }

    fn snapshot(&self) -> Option<&Snapshot> {
        self.base().snapshot.as_ref()
    }

    fn commit(&self) -> Option<&Commit> {
        self.base().commit.as_ref()
    }

    /// Not yet in the repository.
    fn is_new(&self) -> bool {
        self.base().snapshot.is_none()
    }

    /// Hex id of the snapshot, empty for new objects.
    fn sha(&self) -> String {
        self.snapshot().map(Snapshot::sha).unwrap_or_default()
    }

    /// Resolved without a version id, saved, or new.
    fn is_current(&self) -> bool {
        self.base().current || self.is_new()
    }

    fn name(&self) -> &str {
        path::last_segment(self.path())
    }

    /// Name without its extension.
    fn pretty_name(&self) -> String {
        strip_extension(self.name()).to_string()
    }

    /// Name usable as a file name: `root` for the root, and anything
    /// outside `[A-Za-z0-9_.-]` replaced by `_`.
    fn safe_name(&self) -> String {
        let name = self.name();
        let name = if name.trim().is_empty() { "root" } else { name };
        name.chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }

    fn history(&self) -> WikiResult<&[Commit]> {
        let base = self.base();
        base.history.history(base.repo.as_ref(), &base.path)
    }

    fn latest_commit(&self) -> WikiResult<Option<&Commit>> {
        let base = self.base();
        base.history
            .latest(base.repo.as_ref(), &base.path, base.commit.as_ref())
    }

    fn prev_commit(&self) -> WikiResult<Option<&Commit>> {
        let base = self.base();
        base.history
            .prev(base.repo.as_ref(), &base.path, base.commit.as_ref())
    }

    fn next_commit(&self) -> WikiResult<Option<&Commit>> {
        let base = self.base();
        base.history
            .next(base.repo.as_ref(), &base.path, base.commit.as_ref())
    }

    /// Changes to this path between two version ids.
    fn diff(&self, from: &str, to: &str) -> WikiResult<PathDiff> {
        Ok(self.repository().diff(from, to, self.path())?)
    }
}

/// Drop one trailing `.ext`.
pub(crate) fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(i) if i + 1 < name.len() => &name[..i],
        _ => name,
    }
}

/// A resolved object: exactly one of page or tree.
#[derive(Clone, Debug)]
pub enum Object {
    Page(Page),
    Tree(Tree),
}

impl Object {
    pub fn is_page(&self) -> bool {
        matches!(self, Self::Page(_))
    }

    pub fn is_tree(&self) -> bool {
        matches!(self, Self::Tree(_))
    }

    pub fn as_page(&self) -> Option<&Page> {
        match self {
            Self::Page(p) => Some(p),
            Self::Tree(_) => None,
        }
    }

    pub fn as_tree(&self) -> Option<&Tree> {
        match self {
            Self::Tree(t) => Some(t),
            Self::Page(_) => None,
        }
    }

    pub fn into_page(self) -> Option<Page> {
        match self {
            Self::Page(p) => Some(p),
            Self::Tree(_) => None,
        }
    }

    pub fn into_tree(self) -> Option<Tree> {
        match self {
            Self::Tree(t) => Some(t),
            Self::Page(_) => None,
        }
    }
}

impl ContentObject for Object {
    fn base(&self) -> &ObjectBase {
        match self {
            Self::Page(p) => p.base(),
            Self::Tree(t) => t.base(),
        }
    }

    fn pretty_name(&self) -> String {
        match self {
            Self::Page(p) => p.pretty_name(),
            Self::Tree(t) => t.pretty_name(),
        }
    }
}
