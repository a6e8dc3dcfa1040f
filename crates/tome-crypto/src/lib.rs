//! Content hashing for Tome.
//!
//! Objects are addressed by a BLAKE3 hash taken over a per-kind domain tag
//! and the object bytes. All crypto operations wrap established
//! libraries.

pub mod hasher;

pub use hasher::ContentHasher;
