use std::path::PathBuf;

use tome_types::ObjectId;

/// Errors from repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("not a tome repository: {0}")]
    NotInitialized(PathBuf),

    #[error("repository already exists: {0}")]
    AlreadyInitialized(PathBuf),

    /// A version id did not name exactly one commit.
    #[error("unknown revision: {0}")]
    UnknownRevision(String),

    /// The path points into the repository metadata directory.
    #[error("reserved path: {0}")]
    ReservedPath(String),

    /// Empty path, empty segment or a `..` segment.
    #[error("invalid path: {0:?}")]
    InvalidPath(String),

    /// Staging a path that is neither in the working area nor tracked.
    #[error("path not found: {0}")]
    PathNotFound(String),

    /// The staged tree is identical to HEAD's.
    #[error("nothing to commit")]
    NothingToCommit,

    /// A commit, tree or blob referenced by history is missing.
    #[error("object not found in store: {0:?}")]
    ObjectNotFound(ObjectId),

    #[error("corrupt repository: {0}")]
    Corrupt(String),

    #[error("store error: {0}")]
    Store(#[from] tome_store::StoreError),

    #[error("index error: {0}")]
    Index(#[from] tome_index::IndexError),

    #[error("diff error: {0}")]
    Diff(#[from] tome_diff::DiffError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for repository operations.
pub type RepoResult<T> = Result<T, RepoError>;
