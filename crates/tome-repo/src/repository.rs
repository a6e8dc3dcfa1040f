//! Store-backed [`VersionBackend`] with a linear, first-parent history.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tempfile::NamedTempFile;
use tome_diff::{diff_files, FileMap, PathDiff};
use tome_index::Index;
use tome_store::{
    Author, CommitObject, EntryMode, FsObjectStore, InMemoryObjectStore, ObjectStore, Tree,
};
use tome_types::{ObjectId, TemporalAnchor};
use tracing::{debug, info};

use crate::archive::write_archive;
use crate::backend::{Snapshot, VersionBackend, WorkingAreaGuard};
use crate::commit::Commit;
use crate::error::{RepoError, RepoResult};

/// Metadata directory inside the working area. Reserved: no wiki path may
/// start with it.
pub const META_DIR: &str = ".tome";
const HEAD_FILE: &str = "HEAD";
const OBJECTS_DIR: &str = "objects";

/// `true` for 5 to 40 hex characters, the accepted form of a version id.
pub fn is_version_id(s: &str) -> bool {
    (5..=40).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_hexdigit())
}

struct RepoState {
    head: Option<ObjectId>,
    index: Index,
}

/// A working directory plus the object store, index and HEAD that
/// version it.
pub struct Repository {
    workdir: PathBuf,
    /// `None` for in-memory repositories, which keep HEAD in memory only.
    meta_dir: Option<PathBuf>,
    store: Arc<dyn ObjectStore>,
    state: RwLock<RepoState>,
    working_area: Mutex<()>,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read().expect("lock poisoned");
        f.debug_struct("Repository")
            .field("workdir", &self.workdir)
            .field("persistent", &self.meta_dir.is_some())
            .field("head", &state.head)
            .field("index", &state.index)
            .finish()
    }
}

impl Repository {
    /// Create an empty repository in `workdir`.
    pub fn init(workdir: impl Into<PathBuf>) -> RepoResult<Self> {
        let workdir = workdir.into();
        let meta = workdir.join(META_DIR);
        if meta.join(HEAD_FILE).exists() {
            return Err(RepoError::AlreadyInitialized(workdir));
        }

        std::fs::create_dir_all(&meta)?;
        let store = FsObjectStore::open(meta.join(OBJECTS_DIR))?;
        std::fs::write(meta.join(HEAD_FILE), "")?;

        info!(path = %workdir.display(), "initialized repository");
        Ok(Self::assemble(workdir, Some(meta), Arc::new(store)))
    }

    /// Open an existing repository and rebuild the index from HEAD.
    pub fn open(workdir: impl Into<PathBuf>) -> RepoResult<Self> {
        let workdir = workdir.into();
        let meta = workdir.join(META_DIR);
        let head_path = meta.join(HEAD_FILE);
        if !head_path.is_file() {
            return Err(RepoError::NotInitialized(workdir));
        }

        let store = FsObjectStore::open(meta.join(OBJECTS_DIR))?;
        let raw = std::fs::read_to_string(&head_path)?;
        let head = match raw.trim() {
            "" => None,
            hex => Some(
                ObjectId::from_hex(hex).map_err(|e| RepoError::Corrupt(format!("HEAD: {e}")))?,
            ),
        };

        let repo = Self::assemble(workdir, Some(meta), Arc::new(store));
        if let Some(head) = head {
            let commit = repo.read_commit(&head)?;
            let mut state = repo.state.write().expect("lock poisoned");
            state.index.read_tree(&commit.tree)?;
            state.head = Some(head);
        }

        info!(path = %repo.workdir.display(), head = ?head, "opened repository");
        Ok(repo)
    }

    /// Repository whose objects and HEAD live in memory. Saves still write
    /// into `workdir`.
    pub fn in_memory(workdir: impl Into<PathBuf>) -> Self {
        Self::assemble(workdir.into(), None, Arc::new(InMemoryObjectStore::new()))
    }

    fn assemble(workdir: PathBuf, meta_dir: Option<PathBuf>, store: Arc<dyn ObjectStore>) -> Self {
        let index = Index::new(Arc::clone(&store));
        Self {
            workdir,
            meta_dir,
            store,
            state: RwLock::new(RepoState { head: None, index }),
            working_area: Mutex::new(()),
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    pub fn store(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }

    /// Newest commit, `None` before the first commit.
    pub fn head(&self) -> RepoResult<Option<Commit>> {
        let head = self.state.read().expect("lock poisoned").head;
        head.map(|id| self.read_commit(&id)).transpose()
    }

    /// Number of commits reachable from HEAD.
    pub fn commit_count(&self) -> RepoResult<usize> {
        Ok(self.history_for_path("", None, None)?.len())
    }

    /// Decode the commit object `id`.
    pub fn read_commit(&self, id: &ObjectId) -> RepoResult<Commit> {
        let stored = self.store.read(id)?.ok_or(RepoError::ObjectNotFound(*id))?;
        Ok(Commit::from_object(*id, CommitObject::from_stored_object(stored)?))
    }

    /// Snapshot at `path` inside the tree `root`. The empty path is the
    /// root itself.
    pub fn snapshot_at(&self, root: &ObjectId, path: &str) -> RepoResult<Option<Snapshot>> {
        let mut current = Snapshot::new(*root, EntryMode::Directory);
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            match self.child_of(&current, segment)? {
                Some(child) => current = child,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    fn read_tree(&self, id: &ObjectId) -> RepoResult<Tree> {
        let stored = self.store.read(id)?.ok_or(RepoError::ObjectNotFound(*id))?;
        Ok(Tree::from_stored_object(stored)?)
    }

    /// Every file below `path` in the tree `root`, keyed by full path.
    fn files_under(&self, root: &ObjectId, path: &str) -> RepoResult<FileMap> {
        let mut files = FileMap::new();
        match self.snapshot_at(root, path)? {
            None => {}
            Some(snapshot) if snapshot.is_file() => {
                files.insert(path.to_string(), snapshot.id);
            }
            Some(snapshot) => self.collect_files(&snapshot, path, &mut files)?,
        }
        Ok(files)
    }

    fn collect_files(&self, dir: &Snapshot, prefix: &str, out: &mut FileMap) -> RepoResult<()> {
        for (name, child) in self.entries(dir)? {
            let path = if prefix.is_empty() {
                name
            } else {
                format!("{prefix}/{name}")
            };
            if child.is_directory() {
                self.collect_files(&child, &path, out)?;
            } else {
                out.insert(path, child.id);
            }
        }
        Ok(())
    }

    fn working_path(&self, path: &str) -> RepoResult<PathBuf> {
        check_path(path)?;
        Ok(path.split('/').fold(self.workdir.clone(), |p, s| p.join(s)))
    }

    fn write_head(&self, id: &ObjectId) -> RepoResult<()> {
        let Some(meta) = &self.meta_dir else {
            return Ok(());
        };
        let mut tmp = NamedTempFile::new_in(meta)?;
        tmp.write_all(id.to_hex().as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(meta.join(HEAD_FILE))
            .map_err(|e| RepoError::Io(e.error))?;
        Ok(())
    }
}

fn check_path(path: &str) -> RepoResult<()> {
    if path.is_empty() || path.split('/').any(|s| s.is_empty() || s == "." || s == "..") {
        return Err(RepoError::InvalidPath(path.to_string()));
    }
    if path.split('/').next() == Some(META_DIR) {
        return Err(RepoError::ReservedPath(path.to_string()));
    }
    Ok(())
}

impl VersionBackend for Repository {
    fn latest_commit_for_path(&self, path: &str) -> RepoResult<Option<Commit>> {
        Ok(self.history_for_path(path, Some(1), None)?.into_iter().next())
    }

    fn commit_by_id(&self, id: &str) -> RepoResult<Option<Commit>> {
        if !is_version_id(id) {
            return Ok(None);
        }
        let mut found = None;
        for commit in self.history_for_path("", None, None)? {
            if commit.id.matches_prefix(id) {
                if found.is_some() {
                    debug!(prefix = id, "ambiguous version id");
                    return Ok(None);
                }
                found = Some(commit);
            }
        }
        Ok(found)
    }

    fn root_snapshot(&self, commit: &Commit) -> Snapshot {
        Snapshot::new(commit.tree, EntryMode::Directory)
    }

    fn child_of(&self, snapshot: &Snapshot, name: &str) -> RepoResult<Option<Snapshot>> {
        if !snapshot.is_directory() {
            return Ok(None);
        }
        let tree = self.read_tree(&snapshot.id)?;
        Ok(tree.get(name).map(|e| Snapshot::new(e.object_id, e.mode)))
    }

    fn entries(&self, snapshot: &Snapshot) -> RepoResult<Vec<(String, Snapshot)>> {
        if !snapshot.is_directory() {
            return Ok(Vec::new());
        }
        let tree = self.read_tree(&snapshot.id)?;
        Ok(tree
            .entries
            .into_iter()
            .map(|e| (e.name, Snapshot::new(e.object_id, e.mode)))
            .collect())
    }

    fn file_bytes(&self, snapshot: &Snapshot) -> RepoResult<Vec<u8>> {
        let blob = self
            .store
            .read_blob(&snapshot.id)?
            .ok_or(RepoError::ObjectNotFound(snapshot.id))?;
        Ok(blob.data)
    }

    fn history_for_path(
        &self,
        path: &str,
        limit: Option<usize>,
        anchor: Option<&Commit>,
    ) -> RepoResult<Vec<Commit>> {
        let start = match anchor {
            Some(commit) => Some(commit.clone()),
            None => self.head()?,
        };

        let mut matches = Vec::new();
        let mut next = start;
        while let Some(commit) = next.take() {
            if limit.is_some_and(|l| matches.len() >= l) {
                break;
            }
            let parent = commit.parent.map(|p| self.read_commit(&p)).transpose()?;
            let touched = path.is_empty() || {
                let here = self.snapshot_at(&commit.tree, path)?;
                let before = match &parent {
                    Some(p) => self.snapshot_at(&p.tree, path)?,
                    None => None,
                };
                here != before
            };
            if touched {
                matches.push(commit);
            }
            next = parent;
        }
        Ok(matches)
    }

    fn stage(&self, path: &str) -> RepoResult<()> {
        let full = self.working_path(path)?;
        let mut state = self.state.write().expect("lock poisoned");
        match std::fs::read(&full) {
            Ok(bytes) => {
                state.index.stage_file(path, &bytes, EntryMode::Regular)?;
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                if state.index.get(path).is_none() {
                    return Err(RepoError::PathNotFound(path.to_string()));
                }
                state.index.remove(path)?;
                debug!(path, "staged removal");
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    fn commit(&self, message: &str, author: Option<&Author>) -> RepoResult<Commit> {
        let mut state = self.state.write().expect("lock poisoned");
        let tree = state.index.write_tree()?;
        let parent = state.head.map(|id| self.read_commit(&id)).transpose()?;
        let unchanged = match &parent {
            Some(p) => p.tree == tree,
            None => state.index.is_empty(),
        };
        if unchanged {
            debug!(tree = %tree.short_hex(), "refusing empty commit");
            return Err(RepoError::NothingToCommit);
        }
        let committer_date = match &parent {
            Some(p) => TemporalAnchor::successor_of(&p.committer_date),
            None => TemporalAnchor::now(),
        };

        let object = CommitObject {
            tree,
            parent: state.head,
            message: message.to_string(),
            author: author.cloned(),
            committer_date,
        };
        let object_id = self.store.write(&object.to_stored_object()?)?;
        self.write_head(&object_id)?;
        state.head = Some(object_id);

        let commit = Commit::from_object(object_id, object);
        info!(
            commit = %commit.short_sha(),
            tree = %tree.short_hex(),
            message = commit.summary(),
            "committed"
        );
        Ok(commit)
    }

    fn diff(&self, from: &str, to: &str, path: &str) -> RepoResult<PathDiff> {
        let from_commit = self
            .commit_by_id(from)?
            .ok_or_else(|| RepoError::UnknownRevision(from.to_string()))?;
        let to_commit = self
            .commit_by_id(to)?
            .ok_or_else(|| RepoError::UnknownRevision(to.to_string()))?;

        let old = self.files_under(&from_commit.tree, path)?;
        let new = self.files_under(&to_commit.tree, path)?;
        let files = diff_files(self.store.as_ref(), &old, &new)?;

        Ok(PathDiff {
            path: path.to_string(),
            from: from_commit.id,
            to: to_commit.id,
            files,
        })
    }

    fn archive(&self, tree_id: &ObjectId, prefix: &str) -> RepoResult<Vec<u8>> {
        write_archive(self.store.as_ref(), tree_id, prefix)
    }

    fn write_working_file(&self, path: &str, bytes: &[u8]) -> RepoResult<()> {
        let full = self.working_path(path)?;
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&full, bytes)?;
        debug!(path, size = bytes.len(), "wrote working file");
        Ok(())
    }

    fn lock_working_area(&self) -> WorkingAreaGuard<'_> {
        self.working_area.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn save(repo: &Repository, path: &str, content: &str, message: &str) -> Commit {
        repo.write_working_file(path, content.as_bytes()).unwrap();
        repo.stage(path).unwrap();
        repo.commit(message, None).unwrap()
    }

    fn temp_repo() -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        (dir, repo)
    }

    #[test]
    fn init_creates_metadata_and_empty_head() {
        let (dir, repo) = temp_repo();
        assert!(dir.path().join(".tome/HEAD").is_file());
        assert!(dir.path().join(".tome/objects").is_dir());
        assert!(repo.head().unwrap().is_none());
        assert_eq!(repo.commit_count().unwrap(), 0);
    }

    #[test]
    fn init_twice_fails() {
        let (dir, _repo) = temp_repo();
        let err = Repository::init(dir.path()).unwrap_err();
        assert!(matches!(err, RepoError::AlreadyInitialized(_)));
    }

    #[test]
    fn open_without_metadata_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Repository::open(dir.path()).unwrap_err();
        assert!(matches!(err, RepoError::NotInitialized(_)));
    }

    #[test]
    fn reopen_keeps_head_and_index() {
        let (dir, repo) = temp_repo();
        let first = save(&repo, "home.md", "home", "first");
        drop(repo);

        let reopened = Repository::open(dir.path()).unwrap();
        assert_eq!(reopened.head().unwrap().unwrap().id, first.id);

        // The rebuilt index still tracks home.md, so a new file is added
        // next to it instead of replacing the tree.
        save(&reopened, "other.md", "other", "second");
        let head = reopened.head().unwrap().unwrap();
        assert!(reopened.snapshot_at(&head.tree, "home.md").unwrap().is_some());
        assert_eq!(reopened.commit_count().unwrap(), 2);
    }

    #[test]
    fn commit_dates_strictly_increase() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::in_memory(dir.path());
        let a = save(&repo, "a.md", "1", "one");
        let b = save(&repo, "a.md", "2", "two");
        let c = save(&repo, "a.md", "3", "three");
        assert!(b.committer_date.is_after(&a.committer_date));
        assert!(c.committer_date.is_after(&b.committer_date));
        assert_eq!(c.parent, Some(b.object_id));
    }

    #[test]
    fn history_filters_by_path() {
        let (_dir, repo) = temp_repo();
        let a1 = save(&repo, "docs/a.md", "a1", "a1");
        let b1 = save(&repo, "docs/b.md", "b1", "b1");
        let a2 = save(&repo, "docs/a.md", "a2", "a2");

        let ids = |v: Vec<Commit>| v.into_iter().map(|c| c.id).collect::<Vec<_>>();
        assert_eq!(ids(repo.history_for_path("docs/a.md", None, None).unwrap()), [a2.id, a1.id]);
        assert_eq!(ids(repo.history_for_path("docs/b.md", None, None).unwrap()), [b1.id]);
        assert_eq!(ids(repo.history_for_path("docs", None, None).unwrap()), [a2.id, b1.id, a1.id]);
        assert_eq!(ids(repo.history_for_path("", Some(2), None).unwrap()), [a2.id, b1.id]);
        assert!(repo.history_for_path("missing.md", None, None).unwrap().is_empty());
    }

    #[test]
    fn history_walks_back_from_anchor() {
        let (_dir, repo) = temp_repo();
        let c1 = save(&repo, "p.md", "1", "1");
        let c2 = save(&repo, "p.md", "2", "2");
        save(&repo, "p.md", "3", "3");

        let anchored = repo.history_for_path("p.md", Some(2), Some(&c2)).unwrap();
        assert_eq!(anchored.iter().map(|c| c.id).collect::<Vec<_>>(), [c2.id, c1.id]);
        assert_eq!(repo.latest_commit_for_path("p.md").unwrap().unwrap().message, "3");
    }

    #[test]
    fn commit_lookup_by_prefix() {
        let (_dir, repo) = temp_repo();
        let commit = save(&repo, "a.md", "a", "a");
        let sha = commit.sha();

        assert_eq!(repo.commit_by_id(&sha).unwrap().unwrap().id, commit.id);
        assert_eq!(repo.commit_by_id(&sha[..7]).unwrap().unwrap().id, commit.id);
        assert_eq!(
            repo.commit_by_id(&sha[..8].to_ascii_uppercase()).unwrap().unwrap().id,
            commit.id
        );
        assert!(repo.commit_by_id(&sha[..4]).unwrap().is_none());
        assert!(repo.commit_by_id("zzzzzzz").unwrap().is_none());
    }

    #[test]
    fn snapshots_walk_the_tree() {
        let (_dir, repo) = temp_repo();
        let commit = save(&repo, "docs/guide/intro.md", "intro", "add");
        let root = repo.root_snapshot(&commit);
        let docs = repo.child_of(&root, "docs").unwrap().unwrap();
        assert!(docs.is_directory());
        let entries = repo.entries(&docs).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "guide");

        let intro = repo.snapshot_at(&commit.tree, "docs/guide/intro.md").unwrap().unwrap();
        assert!(intro.is_file());
        assert_eq!(repo.file_bytes(&intro).unwrap(), b"intro");
        assert!(repo.child_of(&intro, "anything").unwrap().is_none());
        assert!(repo.child_of(&root, "nope").unwrap().is_none());
    }

    #[test]
    fn metadata_directory_is_reserved() {
        let (_dir, repo) = temp_repo();
        let err = repo.write_working_file(".tome/HEAD", b"x").unwrap_err();
        assert!(matches!(err, RepoError::ReservedPath(_)));
        assert!(matches!(repo.stage(".tome/x"), Err(RepoError::ReservedPath(_))));
        assert!(matches!(repo.stage("a/../b"), Err(RepoError::InvalidPath(_))));
    }

    #[test]
    fn staging_a_deleted_file_removes_it() {
        let (dir, repo) = temp_repo();
        save(&repo, "gone.md", "bye", "add");
        std::fs::remove_file(dir.path().join("gone.md")).unwrap();
        repo.stage("gone.md").unwrap();
        let commit = repo.commit("remove", None).unwrap();
        assert!(repo.snapshot_at(&commit.tree, "gone.md").unwrap().is_none());
        assert!(matches!(repo.stage("never.md"), Err(RepoError::PathNotFound(_))));
    }

    #[test]
    fn diff_between_commits_restricted_to_path() {
        let (_dir, repo) = temp_repo();
        let c1 = save(&repo, "docs/a.md", "one\ntwo\n", "c1");
        save(&repo, "other.md", "noise\n", "noise");
        let c3 = save(&repo, "docs/a.md", "one\n2\n", "c3");

        let diff = repo.diff(&c1.sha(), &c3.sha(), "docs").unwrap();
        assert_eq!(diff.files.len(), 1);
        assert_eq!((diff.additions(), diff.deletions()), (1, 1));
        assert!(diff.render().contains("+++ b/docs/a.md"));

        let err = repo.diff("abcdefabcdef", &c3.sha(), "docs").unwrap_err();
        assert!(matches!(err, RepoError::UnknownRevision(_)));
    }

    #[test]
    fn unchanged_tree_is_not_committed() {
        let (_dir, repo) = temp_repo();
        assert!(matches!(repo.commit("empty", None), Err(RepoError::NothingToCommit)));

        let first = save(&repo, "a.md", "same", "first");
        repo.write_working_file("a.md", b"same").unwrap();
        repo.stage("a.md").unwrap();
        assert!(matches!(repo.commit("again", None), Err(RepoError::NothingToCommit)));
        assert_eq!(repo.commit_count().unwrap(), 1);
        assert_eq!(repo.head().unwrap().unwrap().id, first.id);
    }

    #[test]
    fn author_is_recorded() {
        let (_dir, repo) = temp_repo();
        repo.write_working_file("a.md", b"a").unwrap();
        repo.stage("a.md").unwrap();
        let author = Author::new("Ada", "ada@example.org");
        let commit = repo.commit("by ada", Some(&author)).unwrap();
        assert_eq!(repo.read_commit(&commit.object_id).unwrap().author, Some(author));
    }

    #[test]
    fn archive_of_head_tree() {
        let (_dir, repo) = temp_repo();
        let commit = save(&repo, "docs/a.md", "a", "a");
        let docs = repo.snapshot_at(&commit.tree, "docs").unwrap().unwrap();
        let bytes = repo.archive(&docs.id, "docs/").unwrap();
        assert_eq!(&bytes[..2], &[0x1f, 0x8b]);
    }

    #[test]
    fn working_area_lock_is_exclusive() {
        let (_dir, repo) = temp_repo();
        let guard = repo.lock_working_area();
        assert!(repo.working_area.try_lock().is_err());
        drop(guard);
        assert!(repo.working_area.try_lock().is_ok());
    }

    #[test]
    fn version_id_grammar() {
        assert!(is_version_id("abcde"));
        assert!(is_version_id("ABCDEF0123"));
        assert!(!is_version_id("abcd"));
        assert!(!is_version_id(&"a".repeat(41)));
        assert!(!is_version_id("abcdg"));
    }
}
