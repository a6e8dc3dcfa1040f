//! Diff engine for Tome.
//!
//! Compares the files below a path at two commits and produces per-file
//! change records with line-level content diffs.
//!
//! # Key Types
//!
//! - [`FileChange`] -- added / deleted / modified file between two file maps
//! - [`ContentDiff`] -- line diff of two blobs (unified text + counts)
//! - [`PathDiff`] -- every file diff under one path between two commits

pub mod content;
pub mod error;
pub mod files;

pub use content::{diff_content, ContentDiff};
pub use error::{DiffError, DiffResult};
pub use files::{diff_file_maps, diff_files, FileChange, FileDiff, FileMap, PathDiff};
