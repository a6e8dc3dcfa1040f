//! Version-control backend for Tome.
//!
//! A small, linear, git-like history over a content-addressed
//! [`ObjectStore`](tome_store::ObjectStore): a working directory, a staging
//! [`Index`](tome_index::Index), a HEAD pointer and commit objects that each
//! point at a root tree.
//!
//! # Key Types
//!
//! - [`VersionBackend`] -- what the wiki object model needs from a backend
//! - [`Repository`] -- the store-backed implementation
//! - [`Commit`] -- a decoded commit with its user-facing [`CommitId`](tome_types::CommitId)
//! - [`Snapshot`] -- one immutable tree or blob inside a commit
//!
//! # Layout
//!
//! ```text
//! <workdir>/            working area (files written by saves)
//! <workdir>/.tome/      repository metadata, reserved
//!     objects/xx/...    loose objects
//!     HEAD              hex id of the newest commit object
//! ```

pub mod archive;
pub mod backend;
pub mod commit;
pub mod error;
pub mod repository;

pub use backend::{Snapshot, VersionBackend, WorkingAreaGuard};
pub use commit::Commit;
pub use error::{RepoError, RepoResult};
pub use repository::{is_version_id, Repository, META_DIR};
pub use tome_diff::PathDiff;
pub use tome_store::{Author, EntryMode};
