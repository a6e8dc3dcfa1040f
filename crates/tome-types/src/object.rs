use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Content-addressed identifier for a stored blob, tree or commit.
///
/// An `ObjectId` is the BLAKE3 hash of an object's content, so identical
/// content always maps to the same id.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId([u8; 32]);

impl ObjectId {
    /// Hash raw bytes into an id (no domain separation).
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Wrap a pre-computed hash.
    pub fn from_hash(hash: [u8; 32]) -> Self {
        Self(hash)
    }

    /// The all-zero id. Never produced by hashing; used as "no object".
    pub const fn null() -> Self {
        Self([0u8; 32])
    }

    pub fn is_null(&self) -> bool {
        self.0 == [0u8; 32]
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Full 64-character lowercase hex form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        decode_fixed::<32>(s).map(Self)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.short_hex())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<[u8; 32]> for ObjectId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// User-facing commit identifier.
///
/// The first 20 bytes of the commit object's [`ObjectId`], rendered as 40
/// hex characters. Callers may abbreviate it to any unique prefix of at
/// least five characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CommitId([u8; 20]);

impl CommitId {
    /// Number of hex characters in a full commit id.
    pub const HEX_LEN: usize = 40;

    /// Derive the commit id from the id of the stored commit object.
    pub fn from_object(id: &ObjectId) -> Self {
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&id.as_bytes()[..20]);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Seven-character abbreviation for log output.
    pub fn short_hex(&self) -> String {
        let mut hex = self.to_hex();
        hex.truncate(7);
        hex
    }

    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        decode_fixed::<20>(s).map(Self)
    }

    /// Case-insensitive hex prefix match. An empty prefix matches nothing.
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        if prefix.is_empty() || prefix.len() > Self::HEX_LEN {
            return false;
        }
        self.to_hex().starts_with(&prefix.to_ascii_lowercase())
    }
}

impl fmt::Debug for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommitId({})", self.short_hex())
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N], TypeError> {
    let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
    if bytes.len() != N {
        return Err(TypeError::InvalidLength {
            expected: N,
            actual: bytes.len(),
        });
    }
    let mut arr = [0u8; N];
    arr.copy_from_slice(&bytes);
    Ok(arr)
}
