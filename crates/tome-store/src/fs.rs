use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tome_types::ObjectId;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::object::{ObjectKind, StoredObject};
use crate::traits::ObjectStore;

/// Loose-object store on the local filesystem.
///
/// Each object lives at `<root>/<first two hex chars>/<remaining hex>` as a
/// single kind tag byte followed by the raw object bytes. Writes go to a
/// temporary file in the fan-out directory and are renamed into place, so a
/// reader never observes a half-written object. Reads re-hash the bytes and
/// fail on mismatch.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, id: &ObjectId) -> PathBuf {
        let hex = id.to_hex();
        self.root.join(&hex[..2]).join(&hex[2..])
    }
}

impl ObjectStore for FsObjectStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
        let raw = match std::fs::read(self.object_path(id)) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let (tag, data) = raw.split_first().ok_or_else(|| StoreError::CorruptObject {
            id: *id,
            reason: "empty object file".into(),
        })?;
        let kind = ObjectKind::from_tag(*tag).ok_or_else(|| StoreError::CorruptObject {
            id: *id,
            reason: format!("unknown kind tag {tag:#04x}"),
        })?;

        let object = StoredObject::new(kind, data.to_vec());
        let computed = object.compute_id();
        if computed != *id {
            return Err(StoreError::HashMismatch { id: *id, computed });
        }
        Ok(Some(object))
    }

    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId> {
        let id = object.compute_id();
        let path = self.object_path(&id);
        if path.exists() {
            return Ok(id);
        }

        let dir = path.parent().unwrap_or(&self.root);
        std::fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&[object.kind.tag()])?;
        tmp.write_all(&object.data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;

        debug!(id = %id.short_hex(), kind = %object.kind, size = object.size(), "object written");
        Ok(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.object_path(id).is_file())
    }
}
