use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use tome_types::ObjectId;

use crate::error::StoreResult;
use crate::object::{ObjectKind, StoredObject};
use crate::traits::ObjectStore;

/// Object store that keeps everything in process memory.
///
/// Backs in-memory repositories and unit tests;
/// nothing survives the process.
#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<ObjectId, StoredObject>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of stored objects of `kind`.
    pub fn count_of(&self, kind: ObjectKind) -> usize {
        self.objects
            .read()
            .expect("lock poisoned")
            .values()
            .filter(|object| object.kind == kind)
            .count()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
        Ok(self.objects.read().expect("lock poisoned").get(id).cloned())
    }

    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId> {
        let id = object.compute_id();
        self.objects
            .write()
            .expect("lock poisoned")
            .entry(id)
            .or_insert_with(|| object.clone());
        Ok(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.objects.read().expect("lock poisoned").contains_key(id))
    }
}

impl fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryObjectStore")
            .field("blobs", &self.count_of(ObjectKind::Blob))
            .field("trees", &self.count_of(ObjectKind::Tree))
            .field("commits", &self.count_of(ObjectKind::Commit))
            .finish()
    }
}
