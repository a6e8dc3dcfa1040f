use tome_types::ObjectId;

/// Domain-separated BLAKE3 content hasher.
///
/// The domain tag is fed to the hasher ahead of the data, so a blob and a
/// tree with identical bytes never share an id.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for file contents.
    pub const BLOB: Self = Self::new("tome-blob-v1");
    /// Hasher for directory listings.
    pub const TREE: Self = Self::new("tome-tree-v1");
    /// Hasher for commit records.
    pub const COMMIT: Self = Self::new("tome-commit-v1");

    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    pub fn hash(&self, data: &[u8]) -> ObjectId {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        ObjectId::from_hash(*hasher.finalize().as_bytes())
    }

    /// Check that `data` hashes to `expected` under this domain.
    pub fn verify(&self, data: &[u8], expected: &ObjectId) -> bool {
        self.hash(data) == *expected
    }

    pub fn domain(&self) -> &str {
        self.domain
    }
}
