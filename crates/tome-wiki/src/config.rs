use std::path::Path;

use serde::{Deserialize, Serialize};
use tome_repo::Author;

use crate::error::WikiResult;

/// Wiki settings, read from `config.toml`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WikiConfig {
    /// Mime type used when neither extension nor content identify a page.
    pub default_mime: String,
    /// Author recorded on commits that do not name one.
    pub author_name: Option<String>,
    pub author_email: Option<String>,
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            default_mime: "text/plain".into(),
            author_name: None,
            author_email: None,
        }
    }
}

impl WikiConfig {
    pub fn from_toml_str(s: &str) -> WikiResult<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Load from `path`, falling back to defaults when the file is missing.
    pub fn load(path: &Path) -> WikiResult<Self> {
        match std::fs::read_to_string(path) {
            Ok(s) => Self::from_toml_str(&s),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// The configured author, when both name and email are set.
    pub fn default_author(&self) -> Option<Author> {
        match (&self.author_name, &self.author_email) {
            (Some(name), Some(email)) => Some(Author::new(name, email)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WikiError;

    #[test]
    fn default_config() {
        let c = WikiConfig::default();
        assert_eq!(c.default_mime, "text/plain");
        assert!(c.default_author().is_none());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = WikiConfig::from_toml_str("author_name = \"Ada\"\nauthor_email = \"ada@example.org\"\n")
            .unwrap();
        assert_eq!(c.default_mime, "text/plain");
        assert_eq!(c.default_author().unwrap().to_string(), "Ada <ada@example.org>");
    }

    #[test]
    fn author_needs_both_fields() {
        let c = WikiConfig::from_toml_str("author_name = \"Ada\"").unwrap();
        assert!(c.default_author().is_none());
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = WikiConfig::from_toml_str("default_mime = 3").unwrap_err();
        assert!(matches!(err, WikiError::Config(_)));
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(WikiConfig::load(&dir.path().join("nope.toml")).unwrap(), WikiConfig::default());

        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_mime = \"text/markdown\"").unwrap();
        assert_eq!(WikiConfig::load(&path).unwrap().default_mime, "text/markdown");
    }
}
