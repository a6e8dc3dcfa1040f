use tome_repo::RepoError;

/// Errors raised by the wiki object model.
#[derive(Debug, thiserror::Error)]
pub enum WikiError {
    /// The normalized path does not match the path grammar.
    #[error("invalid path: {0:?}")]
    InvalidPath(String),

    #[error("{0} not found")]
    NotFound(String),

    /// A save was attempted with blank content.
    #[error("no content")]
    EmptyContent,

    /// A new page would overwrite an existing object.
    #[error("object already exists: {0}")]
    AlreadyExists(String),

    #[error("backend error: {0}")]
    Backend(#[from] RepoError),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for wiki operations.
pub type WikiResult<T> = Result<T, WikiError>;
