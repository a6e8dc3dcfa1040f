//! Line-level content diff of two blobs.
//!
//! Uses the `similar` crate (Myers diff algorithm) and renders the result
//! in unified format with three lines of context.

use similar::{ChangeTag, TextDiff};

/// The result of diffing two file bodies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentDiff {
    pub additions: usize,
    pub deletions: usize,
    /// Either side was not valid UTF-8; no line diff was computed.
    pub binary: bool,
    /// Unified diff text, empty when the bodies are identical.
    pub unified: String,
}

impl ContentDiff {
    pub fn is_empty(&self) -> bool {
        self.unified.is_empty()
    }
}

/// Diff `old` against `new`, labelling the sides `old_label`/`new_label`
/// in the unified header.
pub fn diff_content(old: &[u8], new: &[u8], old_label: &str, new_label: &str) -> ContentDiff {
    let (old_text, new_text) = match (std::str::from_utf8(old), std::str::from_utf8(new)) {
        (Ok(o), Ok(n)) => (o, n),
        _ => {
            let unified = if old == new {
                String::new()
            } else {
                format!("Binary files {old_label} and {new_label} differ\n")
            };
            return ContentDiff {
                additions: 0,
                deletions: 0,
                binary: true,
                unified,
            };
        }
    };

    if old_text == new_text {
        return ContentDiff {
            additions: 0,
            deletions: 0,
            binary: false,
            unified: String::new(),
        };
    }

    let diff = TextDiff::from_lines(old_text, new_text);
    let (mut additions, mut deletions) = (0, 0);
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => additions += 1,
            ChangeTag::Delete => deletions += 1,
            ChangeTag::Equal => {}
        }
    }

    let unified = diff
        .unified_diff()
        .context_radius(3)
        .header(old_label, new_label)
        .to_string();

    ContentDiff {
        additions,
        deletions,
        binary: false,
        unified,
    }
}
