//! The contract between the wiki object model and a version store.

use std::sync::MutexGuard;

use tome_diff::PathDiff;
use tome_store::{Author, EntryMode};
use tome_types::ObjectId;

use crate::commit::Commit;
use crate::error::RepoResult;

/// Held while a caller runs a multi-step write to the working area.
pub type WorkingAreaGuard<'a> = MutexGuard<'a, ()>;

/// One immutable tree or blob inside a commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Snapshot {
    pub id: ObjectId,
    pub mode: EntryMode,
}

impl Snapshot {
    pub fn new(id: ObjectId, mode: EntryMode) -> Self {
        Self { id, mode }
    }

    pub fn is_file(&self) -> bool {
        self.mode.is_file()
    }

    pub fn is_directory(&self) -> bool {
        self.mode.is_directory()
    }

    /// Hex form of the object id.
    pub fn sha(&self) -> String {
        self.id.to_hex()
    }
}

/// A content-addressed commit store with a working area.
///
/// Lookups return `Ok(None)` for absence. `Err` is reserved for storage
/// failures and corrupt history.
pub trait VersionBackend: Send + Sync {
    /// Newest commit reachable from HEAD that touched `path`.
    fn latest_commit_for_path(&self, path: &str) -> RepoResult<Option<Commit>>;

    /// Commit named by a full id or a unique hex prefix.
    fn commit_by_id(&self, id: &str) -> RepoResult<Option<Commit>>;

    /// Directory snapshot of the commit's root tree.
    fn root_snapshot(&self, commit: &Commit) -> Snapshot;

    /// Child `name` of a directory snapshot. Files have no children.
    fn child_of(&self, snapshot: &Snapshot, name: &str) -> RepoResult<Option<Snapshot>>;

    /// All children of a directory snapshot, sorted by name.
    fn entries(&self, snapshot: &Snapshot) -> RepoResult<Vec<(String, Snapshot)>>;

    fn file_bytes(&self, snapshot: &Snapshot) -> RepoResult<Vec<u8>>;

    /// Commits touching `path`, newest first, walking back from `anchor`
    /// (HEAD when `None`). `limit` caps the number of matches returned.
    fn history_for_path(
        &self,
        path: &str,
        limit: Option<usize>,
        anchor: Option<&Commit>,
    ) -> RepoResult<Vec<Commit>>;

    /// Record the working-area state of `path` in the index.
    fn stage(&self, path: &str) -> RepoResult<()>;

    /// Commit everything staged and advance HEAD.
    fn commit(&self, message: &str, author: Option<&Author>) -> RepoResult<Commit>;

    /// Changes below `path` between two version ids.
    fn diff(&self, from: &str, to: &str, path: &str) -> RepoResult<PathDiff>;

    /// Gzip-compressed tar of every file below `tree_id`, entry names
    /// prefixed with `prefix`.
    fn archive(&self, tree_id: &ObjectId, prefix: &str) -> RepoResult<Vec<u8>>;

    /// Write a file in the working area, creating parent directories.
    fn write_working_file(&self, path: &str, bytes: &[u8]) -> RepoResult<()>;

    /// Serializes write, stage and commit sequences against this repository.
    fn lock_working_area(&self) -> WorkingAreaGuard<'_>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_kind_follows_mode() {
        let file = Snapshot::new(ObjectId::from_bytes(b"f"), EntryMode::Regular);
        let exe = Snapshot::new(ObjectId::from_bytes(b"x"), EntryMode::Executable);
        let dir = Snapshot::new(ObjectId::from_bytes(b"d"), EntryMode::Directory);
        assert!(file.is_file() && exe.is_file());
        assert!(dir.is_directory() && !dir.is_file());
        assert_eq!(file.sha().len(), 64);
    }
}
