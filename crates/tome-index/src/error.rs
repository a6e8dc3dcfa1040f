//! Error types for the index crate.

use tome_types::ObjectId;

/// Errors that can occur during index operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The specified path is not tracked.
    #[error("path not found in index: {0}")]
    PathNotFound(String),

    /// Staging the path would turn a tracked file into a directory or the
    /// other way around.
    #[error("path conflicts with tracked entry {existing}: {path}")]
    PathConflict { path: String, existing: String },

    /// An object referenced by a tree was not found in the store.
    #[error("object not found in store: {0:?}")]
    ObjectNotFound(ObjectId),

    #[error("store error: {0}")]
    Store(#[from] tome_store::StoreError),

    #[error("invalid path: {0}")]
    InvalidPath(String),
}

/// Convenience alias for index results.
pub type IndexResult<T> = Result<T, IndexError>;
