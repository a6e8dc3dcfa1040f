//! Wiki object model for Tome.
//!
//! Every page and directory of the wiki is a path in a versioned
//! repository. This crate maps a path plus an optional version id to an
//! immutable snapshot, exposes the history around it, and saves new page
//! content as commits.
//!
//! # Key Types
//!
//! - [`Object`] -- a resolved [`Page`] or [`Tree`]
//! - [`ContentObject`] -- path, snapshot, commit and history shared by both
//! - [`HistoryCache`] -- memoized latest / prev / next / history lookups
//! - [`MimeDetector`] -- mime classification for pages
//! - [`WikiConfig`] -- settings loaded from `config.toml`
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tome_repo::{Repository, VersionBackend};
//! use tome_wiki::{resolver, ContentObject, Page};
//!
//! # fn main() -> tome_wiki::WikiResult<()> {
//! let repo: Arc<dyn VersionBackend> = Arc::new(Repository::init("wiki")?);
//! let mut page = Page::new(&repo, "docs/readme.md")?;
//! page.write("Hello", "init", None)?;
//!
//! let docs = resolver::resolve_tree_or_fail(&repo, "docs", None)?;
//! assert_eq!(docs.pages()?[0].name(), "readme.md");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod history;
pub mod mime;
pub mod object;
pub mod page;
pub mod path;
pub mod resolver;
pub mod tree;

pub use config::WikiConfig;
pub use error::{WikiError, WikiResult};
pub use history::{HistoryCache, HISTORY_LIMIT};
pub use mime::{Mime, MimeDetector, TableMimeDetector};
pub use object::{ContentObject, Object, ObjectBase};
pub use page::{Page, EMPTY_COMMIT_MESSAGE};
pub use resolver::{
    find_snapshot, resolve, resolve_or_fail, resolve_page, resolve_page_or_fail, resolve_tree,
    resolve_tree_or_fail,
};
pub use tree::{Tree, ROOT_LABEL};
