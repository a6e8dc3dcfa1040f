//! Content-addressed object storage for Tome.
//!
//! A hash-keyed object store analogous to git's `.git/objects/` directory.
//! Every file body, directory listing and commit record is stored as an
//! immutable object identified by its BLAKE3 hash (domain-separated by
//! object kind).
//!
//! # Object Types
//!
//! - [`Blob`] -- file contents
//! - [`Tree`] -- directory listing mapping names to object references
//! - [`CommitObject`] -- root tree, parent link, message, author and date
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//! - [`FsObjectStore`] -- loose objects on disk, one file per object
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. Concurrent reads are always safe.
//! 3. The store never interprets object contents.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod fs;
pub mod memory;
pub mod object;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::FsObjectStore;
pub use memory::InMemoryObjectStore;
pub use object::{
    Author, Blob, CommitObject, EntryMode, ObjectKind, StoredObject, Tree, TreeEntry,
};
pub use traits::ObjectStore;
