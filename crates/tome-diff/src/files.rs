//! File-level diff: compare two flattened file maps and attach content
//! diffs to every changed file.

use std::collections::BTreeMap;

use tome_store::ObjectStore;
use tome_types::{CommitId, ObjectId};

use crate::content::{diff_content, ContentDiff};
use crate::error::{DiffError, DiffResult};

/// Flattened view of the files below some path: full path to blob id.
pub type FileMap = BTreeMap<String, ObjectId>;

/// A single file-level change between two file maps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileChange {
    Added { path: String, new_id: ObjectId },
    Deleted { path: String, old_id: ObjectId },
    Modified {
        path: String,
        old_id: ObjectId,
        new_id: ObjectId,
    },
}

impl FileChange {
    pub fn path(&self) -> &str {
        match self {
            Self::Added { path, .. } | Self::Deleted { path, .. } | Self::Modified { path, .. } => {
                path
            }
        }
    }

    pub fn old_id(&self) -> Option<&ObjectId> {
        match self {
            Self::Added { .. } => None,
            Self::Deleted { old_id, .. } | Self::Modified { old_id, .. } => Some(old_id),
        }
    }

    pub fn new_id(&self) -> Option<&ObjectId> {
        match self {
            Self::Deleted { .. } => None,
            Self::Added { new_id, .. } | Self::Modified { new_id, .. } => Some(new_id),
        }
    }
}

/// Compare two file maps. Changes come out sorted by path.
pub fn diff_file_maps(old: &FileMap, new: &FileMap) -> Vec<FileChange> {
    let mut changes = Vec::new();

    for (path, old_id) in old {
        match new.get(path) {
            Some(new_id) if new_id != old_id => changes.push(FileChange::Modified {
                path: path.clone(),
                old_id: *old_id,
                new_id: *new_id,
            }),
            Some(_) => {}
            None => changes.push(FileChange::Deleted {
                path: path.clone(),
                old_id: *old_id,
            }),
        }
    }
    for (path, new_id) in new {
        if !old.contains_key(path) {
            changes.push(FileChange::Added {
                path: path.clone(),
                new_id: *new_id,
            });
        }
    }

    changes.sort_by(|a, b| a.path().cmp(b.path()));
    changes
}

/// A file change plus its line diff.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileDiff {
    pub change: FileChange,
    pub content: ContentDiff,
}

/// Diff two file maps, reading the changed blobs from `store`.
pub fn diff_files(store: &dyn ObjectStore, old: &FileMap, new: &FileMap) -> DiffResult<Vec<FileDiff>> {
    diff_file_maps(old, new)
        .into_iter()
        .map(|change| {
            let old_bytes = read_optional_blob(store, change.old_id())?;
            let new_bytes = read_optional_blob(store, change.new_id())?;
            let old_label = match change.old_id() {
                Some(_) => format!("a/{}", change.path()),
                None => "/dev/null".to_string(),
            };
            let new_label = match change.new_id() {
                Some(_) => format!("b/{}", change.path()),
                None => "/dev/null".to_string(),
            };
            let content = diff_content(&old_bytes, &new_bytes, &old_label, &new_label);
            Ok(FileDiff { change, content })
        })
        .collect()
}

fn read_optional_blob(store: &dyn ObjectStore, id: Option<&ObjectId>) -> DiffResult<Vec<u8>> {
    let Some(id) = id else {
        return Ok(Vec::new());
    };
    let blob = store.read_blob(id)?.ok_or(DiffError::ObjectNotFound(*id))?;
    Ok(blob.data)
}

/// Every file diff under `path` between commits `from` and `to`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathDiff {
    pub path: String,
    pub from: CommitId,
    pub to: CommitId,
    pub files: Vec<FileDiff>,
}

impl PathDiff {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn additions(&self) -> usize {
        self.files.iter().map(|f| f.content.additions).sum()
    }

    pub fn deletions(&self) -> usize {
        self.files.iter().map(|f| f.content.deletions).sum()
    }

    /// Concatenated unified diff of all files.
    pub fn render(&self) -> String {
        self.files.iter().map(|f| f.content.unified.as_str()).collect()
    }
}
