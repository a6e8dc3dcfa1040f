//! Mime type detection for pages.

use std::collections::HashMap;
use std::fmt;

use crate::config::WikiConfig;

/// A mime type such as `text/markdown`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Mime(String);

impl Mime {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Part before the `/`.
    pub fn media_type(&self) -> &str {
        self.0.split_once('/').map_or(self.0.as_str(), |(t, _)| t)
    }

    pub fn is_text(&self) -> bool {
        self.media_type() == "text"
            || matches!(
                self.0.as_str(),
                "application/json" | "application/toml" | "application/javascript" | "image/svg+xml"
            )
    }
}

impl fmt::Display for Mime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Classifies page content. Consulted by extension first, then by content,
/// then the default.
pub trait MimeDetector {
    fn by_extension(&self, extension: &str) -> Option<Mime>;
    fn by_magic(&self, content: &[u8]) -> Option<Mime>;
    fn default_mime(&self) -> Mime;

    fn detect(&self, extension: &str, content: &[u8]) -> Mime {
        self.by_extension(extension)
            .or_else(|| self.by_magic(content))
            .unwrap_or_else(|| self.default_mime())
    }
}

const EXTENSIONS: &[(&str, &str)] = &[
    ("md", "text/markdown"),
    ("markdown", "text/markdown"),
    ("txt", "text/plain"),
    ("html", "text/html"),
    ("htm", "text/html"),
    ("css", "text/css"),
    ("csv", "text/csv"),
    ("js", "application/javascript"),
    ("json", "application/json"),
    ("toml", "application/toml"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
    ("pdf", "application/pdf"),
    ("gz", "application/gzip"),
];

const MAGIC: &[(&[u8], &str)] = &[
    (b"\x89PNG\r\n\x1a\n", "image/png"),
    (b"\xff\xd8\xff", "image/jpeg"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"%PDF-", "application/pdf"),
    (b"\x1f\x8b", "application/gzip"),
];

/// Lookup-table detector with a configurable default.
#[derive(Clone, Debug)]
pub struct TableMimeDetector {
    extensions: HashMap<String, String>,
    default: String,
}

impl TableMimeDetector {
    pub fn new(default: impl Into<String>) -> Self {
        Self {
            extensions: EXTENSIONS
                .iter()
                .map(|(ext, mime)| (ext.to_string(), mime.to_string()))
                .collect(),
            default: default.into(),
        }
    }

    pub fn from_config(config: &WikiConfig) -> Self {
        Self::new(config.default_mime.clone())
    }

    /// Add or override an extension mapping.
    pub fn with_extension(mut self, extension: &str, mime: impl Into<String>) -> Self {
        self.extensions.insert(extension.to_ascii_lowercase(), mime.into());
        self
    }
}

impl Default for TableMimeDetector {
    fn default() -> Self {
        Self::from_config(&WikiConfig::default())
    }
}

impl MimeDetector for TableMimeDetector {
    fn by_extension(&self, extension: &str) -> Option<Mime> {
        self.extensions
            .get(&extension.to_ascii_lowercase())
            .map(Mime::new)
    }

    fn by_magic(&self, content: &[u8]) -> Option<Mime> {
        MAGIC
            .iter()
            .find(|(magic, _)| content.starts_with(magic))
            .map(|(_, mime)| Mime::new(*mime))
    }

    fn default_mime(&self) -> Mime {
        Mime::new(self.default.clone())
    }
}
