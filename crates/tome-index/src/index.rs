//! The core Index structure managing tracked entries in memory.
//!
//! The [`Index`] keeps a `BTreeMap<String, IndexEntry>` of every file that
//! will appear in the next commit. Filesystem I/O (reading the working
//! area) is the caller's job; the index only talks to the object store.

use std::collections::BTreeMap;
use std::sync::Arc;

use tome_store::{Blob, EntryMode, ObjectStore, Tree, TreeEntry};
use tome_types::ObjectId;
use tracing::debug;

use crate::entry::IndexEntry;
use crate::error::{IndexError, IndexResult};

/// The staging index: the flat file list of the next commit.
pub struct Index {
    entries: BTreeMap<String, IndexEntry>,
    /// Root tree id of the current entries; cleared by every change.
    tree_cache: Option<ObjectId>,
    store: Arc<dyn ObjectStore>,
}

impl std::fmt::Debug for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Index")
            .field("entries", &self.entries.len())
            .field("tree_cache", &self.tree_cache)
            .finish()
    }
}

enum Node<'a> {
    File(&'a IndexEntry),
    Dir(BTreeMap<&'a str, Node<'a>>),
}

impl Index {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            entries: BTreeMap::new(),
            tree_cache: None,
            store,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&IndexEntry> {
        self.entries.get(path)
    }

    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    // ---------------------------------------------------------------
    // Stage operations
    // ---------------------------------------------------------------

    /// Store `content` as a blob and track it at `path`.
    ///
    /// Returns the blob id. Fails with [`IndexError::PathConflict`] when a
    /// parent of `path` is a tracked file or `path` is a tracked directory.
    pub fn stage_file(
        &mut self,
        path: &str,
        content: &[u8],
        mode: EntryMode,
    ) -> IndexResult<ObjectId> {
        check_path(path)?;
        self.check_conflicts(path)?;

        let object_id = self.store.write(&Blob::new(content.to_vec()).to_stored_object())?;
        let entry = IndexEntry::new(path, object_id, mode).with_size(content.len() as u64);
        self.entries.insert(path.to_string(), entry);
        self.tree_cache = None;

        debug!(path, blob = %object_id.short_hex(), size = content.len(), "staged file");
        Ok(object_id)
    }

    /// Stop tracking `path`.
    pub fn remove(&mut self, path: &str) -> IndexResult<IndexEntry> {
        let entry = self
            .entries
            .remove(path)
            .ok_or_else(|| IndexError::PathNotFound(path.to_string()))?;
        self.tree_cache = None;
        Ok(entry)
    }

    fn check_conflicts(&self, path: &str) -> IndexResult<()> {
        for (i, _) in path.match_indices('/') {
            let parent = &path[..i];
            if self.entries.contains_key(parent) {
                return Err(IndexError::PathConflict {
                    path: path.to_string(),
                    existing: parent.to_string(),
                });
            }
        }

        let dir_prefix = format!("{path}/");
        if let Some((existing, _)) = self
            .entries
            .range(dir_prefix.clone()..)
            .next()
            .filter(|(k, _)| k.starts_with(&dir_prefix))
        {
            return Err(IndexError::PathConflict {
                path: path.to_string(),
                existing: existing.clone(),
            });
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Tree building
    // ---------------------------------------------------------------

    /// Write nested tree objects for all entries and return the root id.
    pub fn write_tree(&mut self) -> IndexResult<ObjectId> {
        if let Some(root) = self.tree_cache {
            return Ok(root);
        }

        let mut root: BTreeMap<&str, Node<'_>> = BTreeMap::new();
        for entry in self.entries.values() {
            let segments: Vec<&str> = entry.segments().collect();
            insert_node(&mut root, &segments, entry)?;
        }
        let root_id = write_node(self.store.as_ref(), &root)?;

        debug!(root = %root_id.short_hex(), files = self.entries.len(), "wrote tree");
        self.tree_cache = Some(root_id);
        Ok(root_id)
    }

    /// Replace the entries with the files reachable from `root_id`.
    pub fn read_tree(&mut self, root_id: &ObjectId) -> IndexResult<()> {
        let mut entries = BTreeMap::new();
        flatten(self.store.as_ref(), root_id, "", &mut entries)?;
        self.entries = entries;
        self.tree_cache = Some(*root_id);
        Ok(())
    }
}

fn check_path(path: &str) -> IndexResult<()> {
    if path.is_empty() {
        return Err(IndexError::InvalidPath("empty path".to_string()));
    }
    if path.split('/').any(str::is_empty) {
        return Err(IndexError::InvalidPath(format!("empty segment in {path:?}")));
    }
    Ok(())
}

fn insert_node<'a>(
    dir: &mut BTreeMap<&'a str, Node<'a>>,
    segments: &[&'a str],
    entry: &'a IndexEntry,
) -> IndexResult<()> {
    let conflict = || IndexError::PathConflict {
        path: entry.path.clone(),
        existing: segments[0].to_string(),
    };
    match segments {
        [] => Ok(()),
        [name] => match dir.insert(*name, Node::File(entry)) {
            None => Ok(()),
            Some(_) => Err(conflict()),
        },
        [name, rest @ ..] => {
            let child = dir.entry(*name).or_insert_with(|| Node::Dir(BTreeMap::new()));
            match child {
                Node::Dir(sub) => insert_node(sub, rest, entry),
                Node::File(_) => Err(conflict()),
            }
        }
    }
}

fn write_node(store: &dyn ObjectStore, dir: &BTreeMap<&str, Node<'_>>) -> IndexResult<ObjectId> {
    let mut tree_entries = Vec::with_capacity(dir.len());
    for (name, node) in dir {
        let entry = match node {
            Node::File(e) => TreeEntry::new(e.mode, *name, e.object_id),
            Node::Dir(sub) => TreeEntry::new(EntryMode::Directory, *name, write_node(store, sub)?),
        };
        tree_entries.push(entry);
    }
    let stored = Tree::new(tree_entries).to_stored_object()?;
    Ok(store.write(&stored)?)
}

fn flatten(
    store: &dyn ObjectStore,
    tree_id: &ObjectId,
    prefix: &str,
    out: &mut BTreeMap<String, IndexEntry>,
) -> IndexResult<()> {
    let stored = store
        .read(tree_id)?
        .ok_or(IndexError::ObjectNotFound(*tree_id))?;
    let tree = Tree::from_stored_object(stored)?;

    for te in tree.entries {
        let path = if prefix.is_empty() {
            te.name
        } else {
            format!("{prefix}/{}", te.name)
        };
        if te.mode.is_directory() {
            flatten(store, &te.object_id, &path, out)?;
        } else {
            out.insert(path.clone(), IndexEntry::new(path, te.object_id, te.mode));
        }
    }
    Ok(())
}
