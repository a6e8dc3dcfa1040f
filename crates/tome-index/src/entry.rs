//! Index entry type.

use tome_store::EntryMode;
use tome_types::ObjectId;

/// A tracked file: its repository-relative path and the blob it maps to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexEntry {
    /// `/`-separated path relative to the working area root.
    pub path: String,
    pub object_id: ObjectId,
    pub mode: EntryMode,
    /// Blob size in bytes, or `None` when loaded from a tree without
    /// reading the blob.
    pub size: Option<u64>,
}

impl IndexEntry {
    pub fn new(path: impl Into<String>, object_id: ObjectId, mode: EntryMode) -> Self {
        Self {
            path: path.into(),
            object_id,
            mode,
            size: None,
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Path segments, root first.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('/')
    }
}
