//! Foundation types for Tome.
//!
//! Every other Tome crate depends on `tome-types`. It holds the identifiers
//! that name content in the version store and the clock used to order
//! commits.
//!
//! # Key Types
//!
//! - [`ObjectId`] -- Content-addressed identifier (BLAKE3 hash) of a blob, tree or commit
//! - [`CommitId`] -- 20-byte commit identifier, the user-facing version id
//! - [`TemporalAnchor`] -- Hybrid logical clock timestamp used as commit date

pub mod error;
pub mod object;
pub mod temporal;

pub use error::TypeError;
pub use object::{CommitId, ObjectId};
pub use temporal::TemporalAnchor;
