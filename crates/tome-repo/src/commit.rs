use tome_store::{Author, CommitObject};
use tome_types::{CommitId, ObjectId, TemporalAnchor};

/// A decoded commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Commit {
    /// User-facing id, a prefix of `object_id`.
    pub id: CommitId,
    /// Content hash of the stored commit object.
    pub object_id: ObjectId,
    pub parent: Option<ObjectId>,
    /// Root tree of the whole repository at this commit.
    pub tree: ObjectId,
    pub message: String,
    pub author: Option<Author>,
    pub committer_date: TemporalAnchor,
}

impl Commit {
    pub fn from_object(object_id: ObjectId, object: CommitObject) -> Self {
        Self {
            id: CommitId::from_object(&object_id),
            object_id,
            parent: object.parent,
            tree: object.tree,
            message: object.message,
            author: object.author,
            committer_date: object.committer_date,
        }
    }

    /// Full 40-character hex id.
    pub fn sha(&self) -> String {
        self.id.to_hex()
    }

    pub fn short_sha(&self) -> String {
        self.id.short_hex()
    }

    /// First line of the message.
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(message: &str, parent: Option<ObjectId>) -> Commit {
        let object = CommitObject {
            tree: ObjectId::from_bytes(b"tree"),
            parent,
            message: message.into(),
            author: None,
            committer_date: TemporalAnchor::new(5, 0),
        };
        Commit::from_object(ObjectId::from_bytes(message.as_bytes()), object)
    }

    #[test]
    fn id_is_prefix_of_object_id() {
        let commit = sample("init", None);
        assert_eq!(commit.sha().len(), 40);
        assert!(commit.object_id.to_hex().starts_with(&commit.sha()));
        assert_eq!(commit.short_sha().len(), 7);
        assert!(commit.is_root());
    }

    #[test]
    fn summary_is_first_line() {
        let commit = sample("title\n\nbody text", Some(ObjectId::from_bytes(b"p")));
        assert_eq!(commit.summary(), "title");
        assert!(!commit.is_root());
        assert_eq!(sample("", None).summary(), "");
    }
}
