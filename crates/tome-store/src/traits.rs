use tome_types::ObjectId;

use crate::error::StoreResult;
use crate::object::{Blob, StoredObject};

/// Where page bodies, directory listings and commits are kept.
///
/// Ids are derived from content, so writing the same object twice yields
/// the same id and leaves the store unchanged. Implementations are shared
/// between threads and must tolerate concurrent readers.
pub trait ObjectStore: Send + Sync {
    /// `Ok(None)` when nothing is stored under `id`; `Err` when the stored
    /// bytes cannot be read or fail verification.
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>>;

    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId>;

    fn exists(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Read `id` and decode it as file contents.
    fn read_blob(&self, id: &ObjectId) -> StoreResult<Option<Blob>> {
        self.read(id)?.map(Blob::from_stored_object).transpose()
    }
}
