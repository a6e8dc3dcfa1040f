//! Trees: versioned directories.

use once_cell::unsync::OnceCell;

use crate::error::{WikiError, WikiResult};
use crate::object::{ContentObject, Object, ObjectBase};
use crate::page::Page;
use crate::path;

/// Label of the root tree.
pub const ROOT_LABEL: &str = "Root";

/// A directory in the wiki.
#[derive(Clone, Debug)]
pub struct Tree {
    base: ObjectBase,
    trees: OnceCell<Vec<Tree>>,
    pages: OnceCell<Vec<Page>>,
}

impl Tree {
    pub(crate) fn from_base(base: ObjectBase) -> Self {
        Self {
            base,
            trees: OnceCell::new(),
            pages: OnceCell::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.base.path.is_empty()
    }

    /// Subdirectories, sorted by name. Memoized.
    pub fn trees(&self) -> WikiResult<&[Tree]> {
        let trees = self.trees.get_or_try_init(|| {
            let mut trees: Vec<Tree> = self
                .child_bases(false)?
                .into_iter()
                .map(Tree::from_base)
                .collect();
            trees.sort_by(|a, b| a.name().cmp(b.name()));
            Ok::<_, WikiError>(trees)
        })?;
        Ok(trees)
    }

    /// Files, sorted by name. Memoized.
    pub fn pages(&self) -> WikiResult<&[Page]> {
        let pages = self.pages.get_or_try_init(|| {
            let mut pages: Vec<Page> = self
                .child_bases(true)?
                .into_iter()
                .map(Page::from_base)
                .collect();
            pages.sort_by(|a, b| a.name().cmp(b.name()));
            Ok::<_, WikiError>(pages)
        })?;
        Ok(pages)
    }

    /// Trees first, then pages.
    pub fn children(&self) -> WikiResult<Vec<Object>> {
        let trees = self.trees()?.iter().cloned().map(Object::Tree);
        let pages = self.pages()?.iter().cloned().map(Object::Page);
        Ok(trees.chain(pages).collect())
    }

    fn child_bases(&self, files: bool) -> WikiResult<Vec<ObjectBase>> {
        let Some(snapshot) = &self.base.snapshot else {
            return Ok(Vec::new());
        };
        let current = self.is_current();
        Ok(self
            .base
            .repo
            .entries(snapshot)?
            .into_iter()
            .filter(|(_, child)| child.is_file() == files)
            .map(|(name, child)| {
                ObjectBase::new(
                    self.base.repo.clone(),
                    path::join(&self.base.path, &name),
                    Some(child),
                    self.base.commit.clone(),
                    current,
                )
            })
            .collect())
    }

    /// `.tar.gz` of this tree, entries under `<safe_name>/`.
    pub fn archive(&self) -> WikiResult<Vec<u8>> {
        let snapshot = self
            .base
            .snapshot
            .ok_or_else(|| WikiError::NotFound(self.base.path.clone()))?;
        let prefix = format!("{}/", self.safe_name());
        Ok(self.base.repo.archive(&snapshot.id, &prefix)?)
    }
}

impl ContentObject for Tree {
    fn base(&self) -> &ObjectBase {
        &self.base
    }

    /// `Root` for the root, otherwise a breadcrumb such as `Root/docs/guide`.
    fn pretty_name(&self) -> String {
        if self.is_root() {
            ROOT_LABEL.to_string()
        } else {
            path::join(ROOT_LABEL, &self.base.path)
        }
    }
}
