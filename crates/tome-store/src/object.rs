use serde::{Deserialize, Serialize};
use tome_crypto::ContentHasher;
use tome_types::{ObjectId, TemporalAnchor};

use crate::error::{StoreError, StoreResult};

/// The kind of object stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// File contents.
    Blob,
    /// Directory listing: sorted entries mapping names to object references.
    Tree,
    /// Commit record pointing at a root tree.
    Commit,
}

impl ObjectKind {
    /// Single-byte tag used by on-disk encodings.
    pub fn tag(&self) -> u8 {
        match self {
            Self::Blob => b'b',
            Self::Tree => b't',
            Self::Commit => b'c',
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            b'b' => Some(Self::Blob),
            b't' => Some(Self::Tree),
            b'c' => Some(Self::Commit),
            _ => None,
        }
    }

    fn hasher(&self) -> &'static ContentHasher {
        match self {
            Self::Blob => &ContentHasher::BLOB,
            Self::Tree => &ContentHasher::TREE,
            Self::Commit => &ContentHasher::COMMIT,
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blob => write!(f, "blob"),
            Self::Tree => write!(f, "tree"),
            Self::Commit => write!(f, "commit"),
        }
    }
}

/// A stored object: kind tag plus the encoded bytes.
///
/// `StoredObject` is the unit of storage. The store never interprets the
/// data; decoding is done by [`Blob`], [`Tree`] and [`CommitObject`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    pub kind: ObjectKind,
    pub data: Vec<u8>,
}

impl StoredObject {
    pub fn new(kind: ObjectKind, data: Vec<u8>) -> Self {
        Self { kind, data }
    }

    /// Content-addressed id under the kind's hash domain.
    pub fn compute_id(&self) -> ObjectId {
        self.kind.hasher().hash(&self.data)
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn expect_kind(&self, kind: ObjectKind) -> StoreResult<()> {
        if self.kind == kind {
            return Ok(());
        }
        Err(StoreError::CorruptObject {
            id: self.compute_id(),
            reason: format!("expected {kind}, got {}", self.kind),
        })
    }
}

// ---------------------------------------------------------------------------
// Blob
// ---------------------------------------------------------------------------

/// File contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl Blob {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn to_stored_object(&self) -> StoredObject {
        StoredObject::new(ObjectKind::Blob, self.data.clone())
    }

    pub fn from_stored_object(obj: StoredObject) -> StoreResult<Self> {
        obj.expect_kind(ObjectKind::Blob)?;
        Ok(Self { data: obj.data })
    }
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

/// File mode for a tree entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryMode {
    /// Normal file (0o100644).
    Regular,
    /// Executable file (0o100755).
    Executable,
    /// Subtree (0o040000).
    Directory,
}

impl EntryMode {
    pub fn mode_bits(&self) -> u32 {
        match self {
            Self::Regular => 0o100644,
            Self::Executable => 0o100755,
            Self::Directory => 0o040000,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Directory)
    }

    pub fn is_file(&self) -> bool {
        !self.is_directory()
    }
}

impl std::fmt::Display for EntryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:06o}", self.mode_bits())
    }
}

/// A single named entry in a directory listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub mode: EntryMode,
    pub name: String,
    pub object_id: ObjectId,
}

impl TreeEntry {
    pub fn new(mode: EntryMode, name: impl Into<String>, object_id: ObjectId) -> Self {
        Self {
            mode,
            name: name.into(),
            object_id,
        }
    }
}

impl PartialOrd for TreeEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TreeEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.name.cmp(&other.name)
    }
}

/// Directory listing object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    /// Entries sorted by name.
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    /// Create a tree; entries are sorted by name for deterministic hashing.
    pub fn new(mut entries: Vec<TreeEntry>) -> Self {
        entries.sort();
        Self { entries }
    }

    pub fn to_stored_object(&self) -> StoreResult<StoredObject> {
        let data =
            serde_json::to_vec(self).map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(StoredObject::new(ObjectKind::Tree, data))
    }

    pub fn from_stored_object(obj: StoredObject) -> StoreResult<Self> {
        obj.expect_kind(ObjectKind::Tree)?;
        serde_json::from_slice(&obj.data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Look up an entry by name. Entries are sorted, so this is a binary search.
    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries
            .binary_search_by(|e| e.name.as_str().cmp(name))
            .ok()
            .map(|i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// CommitObject
// ---------------------------------------------------------------------------

/// Identity attached to a commit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub email: String,
}

impl Author {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

impl std::fmt::Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// Commit record: the root tree of the whole repository at this point in
/// history, plus its first parent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitObject {
    pub tree: ObjectId,
    pub parent: Option<ObjectId>,
    pub message: String,
    pub author: Option<Author>,
    pub committer_date: TemporalAnchor,
}

impl CommitObject {
    pub fn to_stored_object(&self) -> StoreResult<StoredObject> {
        let data =
            serde_json::to_vec(self).map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(StoredObject::new(ObjectKind::Commit, data))
    }

    pub fn from_stored_object(obj: StoredObject) -> StoreResult<Self> {
        obj.expect_kind(ObjectKind::Commit)?;
        serde_json::from_slice(&obj.data).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_rejects_tree_object() {
        let stored = StoredObject::new(ObjectKind::Tree, b"{}".to_vec());
        let err = Blob::from_stored_object(stored).unwrap_err();
        assert!(matches!(err, StoreError::CorruptObject { .. }));
    }

    #[test]
    fn tree_entries_sorted_and_searchable() {
        let tree = Tree::new(vec![
            TreeEntry::new(EntryMode::Regular, "zebra.md", ObjectId::null()),
            TreeEntry::new(EntryMode::Directory, "docs", ObjectId::null()),
            TreeEntry::new(EntryMode::Regular, "alpha.md", ObjectId::null()),
        ]);
        let names: Vec<_> = tree.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["alpha.md", "docs", "zebra.md"]);
        assert!(tree.get("docs").unwrap().mode.is_directory());
        assert!(tree.get("missing").is_none());
    }

    #[test]
    fn tree_decodes_what_it_encodes() {
        let tree = Tree::new(vec![TreeEntry::new(
            EntryMode::Regular,
            "readme.md",
            ObjectId::from_bytes(b"x"),
        )]);
        let decoded = Tree::from_stored_object(tree.to_stored_object().unwrap()).unwrap();
        assert_eq!(decoded, tree);
    }

    #[test]
    fn commit_object_keeps_author_and_parent() {
        let commit = CommitObject {
            tree: ObjectId::from_bytes(b"root"),
            parent: Some(ObjectId::from_bytes(b"parent")),
            message: "init".into(),
            author: Some(Author::new("Ada", "ada@example.org")),
            committer_date: TemporalAnchor::new(1000, 1),
        };
        let stored = commit.to_stored_object().unwrap();
        assert_eq!(stored.kind, ObjectKind::Commit);
        assert_eq!(CommitObject::from_stored_object(stored).unwrap(), commit);
    }

    #[test]
    fn kinds_hash_into_separate_domains() {
        let blob = StoredObject::new(ObjectKind::Blob, b"same".to_vec());
        let tree = StoredObject::new(ObjectKind::Tree, b"same".to_vec());
        assert_ne!(blob.compute_id(), tree.compute_id());
    }

    #[test]
    fn kind_tags_are_reversible() {
        for kind in [ObjectKind::Blob, ObjectKind::Tree, ObjectKind::Commit] {
            assert_eq!(ObjectKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(ObjectKind::from_tag(b'x'), None);
    }

    #[test]
    fn entry_mode_display_is_octal() {
        assert_eq!(EntryMode::Regular.to_string(), "100644");
        assert_eq!(EntryMode::Directory.to_string(), "040000");
        assert!(EntryMode::Executable.is_file());
    }

    #[test]
    fn author_display() {
        assert_eq!(
            Author::new("Ada", "ada@example.org").to_string(),
            "Ada <ada@example.org>"
        );
    }
}
