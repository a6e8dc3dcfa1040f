//! Error types for the diff crate.

use tome_types::ObjectId;

/// Errors that can occur during diff operations.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// A blob referenced by a file map was not found in the store.
    #[error("object not found: {0:?}")]
    ObjectNotFound(ObjectId),

    #[error("store error: {0}")]
    Store(#[from] tome_store::StoreError),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
