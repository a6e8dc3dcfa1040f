//! Path and version id to object.

use std::sync::Arc;

use tome_repo::{Commit, Snapshot, VersionBackend};

use crate::error::{WikiError, WikiResult};
use crate::object::{Object, ObjectBase};
use crate::page::Page;
use crate::path;
use crate::tree::Tree;

/// Look up `raw_path` at `version`, or at the newest commit touching the
/// path when no version is given.
///
/// Returns `Ok(None)` when the commit or any path segment is missing.
/// Fails with [`WikiError::InvalidPath`] for paths outside the grammar.
pub fn resolve(
    repo: &Arc<dyn VersionBackend>,
    raw_path: &str,
    version: Option<&str>,
) -> WikiResult<Option<Object>> {
    let path = path::clean(Some(raw_path))?;
    let commit = match version {
        Some(id) => repo.commit_by_id(id)?,
        None => repo.latest_commit_for_path(&path)?,
    };
    let Some(commit) = commit else {
        return Ok(None);
    };
    let Some(snapshot) = find_snapshot(repo.as_ref(), &path, &commit)? else {
        return Ok(None);
    };

    let base = ObjectBase::new(
        Arc::clone(repo),
        path,
        Some(snapshot),
        Some(commit),
        version.is_none(),
    );
    Ok(Some(if snapshot.is_file() {
        Object::Page(Page::from_base(base))
    } else {
        Object::Tree(Tree::from_base(base))
    }))
}

/// [`resolve`], with absence reported as [`WikiError::NotFound`].
pub fn resolve_or_fail(
    repo: &Arc<dyn VersionBackend>,
    raw_path: &str,
    version: Option<&str>,
) -> WikiResult<Object> {
    resolve(repo, raw_path, version)?.ok_or_else(|| not_found(raw_path))
}

/// [`resolve`], keeping the result only if it is a page.
pub fn resolve_page(
    repo: &Arc<dyn VersionBackend>,
    raw_path: &str,
    version: Option<&str>,
) -> WikiResult<Option<Page>> {
    Ok(resolve(repo, raw_path, version)?.and_then(Object::into_page))
}

/// [`resolve`], keeping the result only if it is a tree.
pub fn resolve_tree(
    repo: &Arc<dyn VersionBackend>,
    raw_path: &str,
    version: Option<&str>,
) -> WikiResult<Option<Tree>> {
    Ok(resolve(repo, raw_path, version)?.and_then(Object::into_tree))
}

pub fn resolve_page_or_fail(
    repo: &Arc<dyn VersionBackend>,
    raw_path: &str,
    version: Option<&str>,
) -> WikiResult<Page> {
    resolve_page(repo, raw_path, version)?.ok_or_else(|| not_found(raw_path))
}

pub fn resolve_tree_or_fail(
    repo: &Arc<dyn VersionBackend>,
    raw_path: &str,
    version: Option<&str>,
) -> WikiResult<Tree> {
    resolve_tree(repo, raw_path, version)?.ok_or_else(|| not_found(raw_path))
}

/// Walk `commit`'s root tree one segment of `path` at a time.
pub fn find_snapshot(
    repo: &dyn VersionBackend,
    path: &str,
    commit: &Commit,
) -> WikiResult<Option<Snapshot>> {
    let mut current = repo.root_snapshot(commit);
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        match repo.child_of(&current, segment)? {
            Some(child) => current = child,
            None => return Ok(None),
        }
    }
    Ok(Some(current))
}

fn not_found(raw_path: &str) -> WikiError {
    WikiError::NotFound(path::normalize(Some(raw_path)))
}
