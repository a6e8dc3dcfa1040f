//! Staging index for Tome.
//!
//! Tracks every file path of the next commit and the blob it points at,
//! and turns that flat path map into nested tree objects.
//!
//! # Key Types
//!
//! - [`Index`] -- The in-memory staging area (BTreeMap-backed)
//! - [`IndexEntry`] -- A tracked file entry

pub mod entry;
pub mod error;
pub mod index;

pub use entry::IndexEntry;
pub use error::{IndexError, IndexResult};
pub use index::Index;
