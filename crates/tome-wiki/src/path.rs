//! Path normalization and validation.
//!
//! Wiki paths are `/`-separated and relative to the repository root; the
//! empty string is the root itself.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{WikiError, WikiResult};

/// Allowed characters: ASCII word characters and `: . + - _ /`, with
/// interior spaces. A path may not end in `:` or a space.
static PATH_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_:.+\-/](?:[A-Za-z0-9_:.+\-/ ]*[A-Za-z0-9_.+\-/])?$")
        .expect("path pattern compiles")
});

pub use tome_repo::is_version_id;

/// Canonical form of `raw`: no leading, trailing or doubled slashes and no
/// `.` or blank segments. `..` drops the previous segment and never climbs
/// above the root. Idempotent.
pub fn normalize(raw: Option<&str>) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in raw.unwrap_or_default().split('/') {
        match segment {
            "." => {}
            ".." => {
                segments.pop();
            }
            s if s.trim().is_empty() => {}
            s => segments.push(s),
        }
    }
    segments.join("/")
}

/// Fail with [`WikiError::InvalidPath`] unless `path` is the root or
/// matches the path grammar.
pub fn validate(path: &str) -> WikiResult<()> {
    if path.is_empty() || PATH_PATTERN.is_match(path) {
        Ok(())
    } else {
        Err(WikiError::InvalidPath(path.to_string()))
    }
}

/// [`normalize`] then [`validate`].
pub fn clean(raw: Option<&str>) -> WikiResult<String> {
    let path = normalize(raw);
    validate(&path)?;
    Ok(path)
}

/// Path of child `name` below `parent`.
pub fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

/// Last segment, or the whole path when it has no separator.
pub fn last_segment(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, name)| name)
}
