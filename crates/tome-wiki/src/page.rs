//! Pages: versioned files with staged content.

use std::sync::Arc;

use once_cell::unsync::OnceCell;
use tome_repo::{Author, RepoError, VersionBackend};
use tracing::{debug, info};

use crate::error::{WikiError, WikiResult};
use crate::mime::{Mime, MimeDetector};
use crate::object::{ContentObject, ObjectBase};
use crate::path;
use crate::resolver;

/// Commit message used when a save is given a blank one.
pub const EMPTY_COMMIT_MESSAGE: &str = "(Empty commit message)";

/// A file in the wiki.
#[derive(Clone, Debug)]
pub struct Page {
    base: ObjectBase,
    staged: Option<Vec<u8>>,
    mime: OnceCell<Mime>,
}

impl Page {
    /// A page that does not exist yet at `raw_path`.
    pub fn new(repo: &Arc<dyn VersionBackend>, raw_path: &str) -> WikiResult<Self> {
        let path = path::clean(Some(raw_path))?;
        Ok(Self::from_base(ObjectBase::new(
            Arc::clone(repo),
            path,
            None,
            None,
            false,
        )))
    }

    pub(crate) fn from_base(base: ObjectBase) -> Self {
        Self {
            base,
            staged: None,
            mime: OnceCell::new(),
        }
    }

    /// Staged content if any, otherwise the saved content.
    pub fn content(&self) -> WikiResult<Option<Vec<u8>>> {
        match &self.staged {
            Some(staged) => Ok(Some(staged.clone())),
            None => self.saved_content(),
        }
    }

    /// [`content`](Self::content) decoded as UTF-8, lossily.
    pub fn text(&self) -> WikiResult<Option<String>> {
        Ok(self
            .content()?
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }

    /// Bytes of the bound snapshot; `None` for new pages.
    pub fn saved_content(&self) -> WikiResult<Option<Vec<u8>>> {
        match &self.base.snapshot {
            Some(snapshot) => Ok(Some(self.base.repo.file_bytes(snapshot)?)),
            None => Ok(None),
        }
    }

    /// In the repository with nothing staged.
    pub fn is_saved(&self) -> bool {
        !self.is_new() && self.staged.is_none()
    }

    pub fn staged(&self) -> Option<&[u8]> {
        self.staged.as_deref()
    }

    pub fn set_content(&mut self, content: impl Into<Vec<u8>>) {
        self.staged = Some(content.into());
    }

    /// Stage `content` and [`save`](Self::save).
    pub fn write(
        &mut self,
        content: impl Into<Vec<u8>>,
        message: &str,
        author: Option<&Author>,
    ) -> WikiResult<()> {
        self.set_content(content);
        self.save(message, author)
    }

    /// Commit the staged content.
    ///
    /// Does nothing when the staged bytes equal the saved ones, which
    /// includes a new page with nothing staged. Fails with
    /// [`WikiError::EmptyContent`] when the staged content is missing or
    /// blank, and with [`WikiError::AlreadyExists`] when this page is new
    /// but its path already resolves. Both checks run before anything is
    /// written.
    ///
    /// On success the page is bound to the newest commit touching its path
    /// and marked current, and its memoized history is discarded. When the
    /// staged bytes already match the head revision no commit is created.
    pub fn save(&mut self, message: &str, author: Option<&Author>) -> WikiResult<()> {
        if self.staged == self.saved_content()? {
            debug!(path = %self.base.path, "content unchanged, skipping commit");
            return Ok(());
        }
        let staged = match self.staged.as_deref() {
            Some(bytes) if !bytes.iter().all(u8::is_ascii_whitespace) => bytes,
            _ => return Err(WikiError::EmptyContent),
        };

        let repo = Arc::clone(&self.base.repo);
        let path = self.base.path.clone();
        let message = if message.trim().is_empty() {
            EMPTY_COMMIT_MESSAGE
        } else {
            message
        };

        let guard = repo.lock_working_area();
        if self.is_new() && resolver::resolve(&repo, &path, None)?.is_some() {
            return Err(WikiError::AlreadyExists(path));
        }
        repo.write_working_file(&path, staged)?;
        repo.stage(&path)?;
        let committed = match repo.commit(message, author) {
            Ok(commit) => Some(commit),
            Err(RepoError::NothingToCommit) => None,
            Err(e) => return Err(e.into()),
        };
        drop(guard);

        self.staged = None;
        self.mime = OnceCell::new();
        self.base.history.clear();
        let newest = self
            .history()?
            .first()
            .cloned()
            .ok_or_else(|| WikiError::NotFound(path.clone()))?;
        let snapshot = resolver::find_snapshot(repo.as_ref(), &path, &newest)?
            .ok_or_else(|| WikiError::NotFound(path.clone()))?;

        match &committed {
            Some(commit) => {
                info!(path = %path, commit = %commit.short_sha(), summary = commit.summary(), "saved page")
            }
            None => debug!(path = %path, head = %newest.short_sha(), "content matches head, nothing committed"),
        }
        self.base.commit = Some(newest);
        self.base.snapshot = Some(snapshot);
        self.base.current = true;
        Ok(())
    }

    /// Text after the last `.` of the name, or empty. A leading `.` does
    /// not start an extension.
    pub fn extension(&self) -> &str {
        match self.name().rfind('.') {
            Some(i) if i > 0 => &self.name()[i + 1..],
            _ => "",
        }
    }

    /// Detected by extension, then content, then the detector's default.
    /// Memoized.
    pub fn mime(&self, detector: &dyn MimeDetector) -> WikiResult<&Mime> {
        self.mime.get_or_try_init(|| {
            let content = self.content()?.unwrap_or_default();
            Ok::<_, WikiError>(detector.detect(self.extension(), &content))
        })
    }
}

impl ContentObject for Page {
    fn base(&self) -> &ObjectBase {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mime::TableMimeDetector;
    use crate::testing::{fixture, write};

    #[test]
    fn new_page_state() {
        let fx = fixture();
        let page = Page::new(&fx.backend, "/docs//new.md").unwrap();
        assert_eq!(page.path(), "docs/new.md");
        assert!(page.is_new());
        assert!(page.is_current());
        assert!(!page.is_saved());
        assert_eq!(page.sha(), "");
        assert!(page.commit().is_none());
        assert!(page.content().unwrap().is_none());
    }

    #[test]
    fn new_page_rejects_invalid_path() {
        let fx = fixture();
        assert!(matches!(
            Page::new(&fx.backend, "bad|name"),
            Err(WikiError::InvalidPath(_))
        ));
    }

    #[test]
    fn write_binds_page_to_commit() {
        let fx = fixture();
        let mut page = Page::new(&fx.backend, "docs/readme.md").unwrap();
        page.write("Hello", "init", None).unwrap();

        assert!(!page.is_new());
        assert!(page.is_saved());
        assert!(page.is_current());
        assert_eq!(page.sha().len(), 64);
        assert_eq!(page.content().unwrap().unwrap(), b"Hello");
        assert_eq!(page.commit().unwrap().message, "init");
        assert_eq!(fx.commit_count(), 1);
        assert_eq!(
            std::fs::read(fx.dir.path().join("docs/readme.md")).unwrap(),
            b"Hello"
        );
    }

    #[test]
    fn staged_content_shadows_saved() {
        let fx = fixture();
        write(&fx.backend, "a.md", "saved");
        let mut page = crate::resolve_page_or_fail(&fx.backend, "a.md", None).unwrap();
        page.set_content("draft");
        assert_eq!(page.text().unwrap().unwrap(), "draft");
        assert_eq!(page.saved_content().unwrap().unwrap(), b"saved");
        assert_eq!(page.staged(), Some(&b"draft"[..]));
        assert!(!page.is_saved());
    }

    #[test]
    fn save_without_staged_content_is_rejected() {
        let fx = fixture();
        write(&fx.backend, "a.md", "x");
        let mut page = crate::resolve_page_or_fail(&fx.backend, "a.md", None).unwrap();
        let err = page.save("nothing", None).unwrap_err();
        assert!(matches!(err, WikiError::EmptyContent));
        assert_eq!(fx.commit_count(), 1);
        assert!(page.is_saved());
    }

    #[test]
    fn new_page_with_nothing_staged_saves_nothing() {
        let fx = fixture();
        let mut page = Page::new(&fx.backend, "a.md").unwrap();
        page.save("nothing", None).unwrap();
        assert_eq!(fx.commit_count(), 0);
        assert!(page.is_new());
    }

    #[test]
    fn identical_content_is_not_committed() {
        let fx = fixture();
        let mut page = Page::new(&fx.backend, "a.md").unwrap();
        page.write("same", "first", None).unwrap();
        page.write("same", "second", None).unwrap();
        assert_eq!(fx.commit_count(), 1);
        assert_eq!(page.commit().unwrap().message, "first");
    }

    #[test]
    fn blank_content_is_rejected_before_writing() {
        let fx = fixture();
        let mut page = Page::new(&fx.backend, "blank.md").unwrap();
        for blank in ["", "   ", "\n\t "] {
            let err = page.write(blank, "m", None).unwrap_err();
            assert!(matches!(err, WikiError::EmptyContent));
        }
        assert_eq!(fx.commit_count(), 0);
        assert!(!fx.dir.path().join("blank.md").exists());
        assert!(page.is_new());
    }

    #[test]
    fn creating_over_an_existing_object_fails() {
        let fx = fixture();
        write(&fx.backend, "docs/a.md", "a");

        let mut dup = Page::new(&fx.backend, "docs/a.md").unwrap();
        let err = dup.write("other", "dup", None).unwrap_err();
        assert!(matches!(err, WikiError::AlreadyExists(p) if p == "docs/a.md"));

        let mut over_dir = Page::new(&fx.backend, "docs").unwrap();
        let err = over_dir.write("file", "dup", None).unwrap_err();
        assert!(matches!(err, WikiError::AlreadyExists(_)));

        assert_eq!(fx.commit_count(), 1);
        assert_eq!(std::fs::read(fx.dir.path().join("docs/a.md")).unwrap(), b"a");
    }

    #[test]
    fn blank_message_gets_placeholder() {
        let fx = fixture();
        let mut page = Page::new(&fx.backend, "a.md").unwrap();
        page.write("x", "  ", None).unwrap();
        assert_eq!(page.commit().unwrap().message, EMPTY_COMMIT_MESSAGE);
    }

    #[test]
    fn author_is_passed_through() {
        let fx = fixture();
        let author = Author::new("Ada", "ada@example.org");
        let mut page = Page::new(&fx.backend, "a.md").unwrap();
        page.write("x", "m", Some(&author)).unwrap();
        assert_eq!(page.commit().unwrap().author.as_ref(), Some(&author));
    }

    #[test]
    fn save_refreshes_memoized_history() {
        let fx = fixture();
        write(&fx.backend, "a.md", "v1");
        let mut page = crate::resolve_page_or_fail(&fx.backend, "a.md", None).unwrap();
        assert_eq!(page.history().unwrap().len(), 1);
        assert!(page.latest_commit().unwrap().is_some());

        page.write("v2", "second", None).unwrap();
        assert_eq!(page.history().unwrap().len(), 2);
        assert_eq!(page.commit().unwrap().message, "second");
        assert_eq!(page.latest_commit().unwrap().unwrap().message, "second");
        assert_eq!(page.prev_commit().unwrap().unwrap().message, "update a.md");
    }

    #[test]
    fn historic_page_becomes_current_after_save() {
        let fx = fixture();
        write(&fx.backend, "a.md", "v1");
        let first = fx.repo.head().unwrap().unwrap();
        write(&fx.backend, "a.md", "v2");

        let mut old = crate::resolve_page_or_fail(&fx.backend, "a.md", Some(&first.sha())).unwrap();
        assert!(!old.is_current());
        old.write("v3", "from old", None).unwrap();
        assert!(old.is_current());
        assert_eq!(fx.commit_count(), 3);
    }

    #[test]
    fn historic_page_saved_with_head_content_rebinds_without_commit() {
        let fx = fixture();
        write(&fx.backend, "a.md", "v1");
        let first = fx.repo.head().unwrap().unwrap();
        write(&fx.backend, "a.md", "v2");
        let head = fx.repo.head().unwrap().unwrap();

        let mut old = crate::resolve_page_or_fail(&fx.backend, "a.md", Some(&first.sha())).unwrap();
        old.write("v2", "three", None).unwrap();

        assert_eq!(fx.commit_count(), 2);
        assert_eq!(fx.repo.head().unwrap().unwrap().id, head.id);
        assert_eq!(old.commit().unwrap().id, head.id);
        assert!(old.is_current());
        assert!(old.is_saved());
        assert_eq!(old.content().unwrap().unwrap(), b"v2");
    }

    #[test]
    fn extension_of_last_segment() {
        let fx = fixture();
        let ext = |p: &str| Page::new(&fx.backend, p).unwrap().extension().to_string();
        assert_eq!(ext("docs/readme.md"), "md");
        assert_eq!(ext("archive.tar.gz"), "gz");
        assert_eq!(ext("noext"), "");
        assert_eq!(ext("v1.0/notes"), "");
        assert_eq!(ext(".hidden"), "");
    }

    #[test]
    fn mime_detection_is_memoized() {
        let fx = fixture();
        let detector = TableMimeDetector::default();
        let mut page = Page::new(&fx.backend, "notes").unwrap();
        page.set_content(&b"%PDF-1.4"[..]);
        assert_eq!(page.mime(&detector).unwrap().as_str(), "application/pdf");

        page.set_content("plain words");
        assert_eq!(page.mime(&detector).unwrap().as_str(), "application/pdf");

        let md = Page::new(&fx.backend, "guide.md").unwrap();
        assert_eq!(md.mime(&detector).unwrap().as_str(), "text/markdown");

        let upper = Page::new(&fx.backend, "README.MD").unwrap();
        assert_eq!(upper.mime(&detector).unwrap().as_str(), "text/markdown");
    }

    #[test]
    fn pretty_and_safe_names() {
        let fx = fixture();
        let page = Page::new(&fx.backend, "docs/My Page+1.md").unwrap();
        assert_eq!(page.name(), "My Page+1.md");
        assert_eq!(page.pretty_name(), "My Page+1");
        assert_eq!(page.safe_name(), "My_Page_1.md");
    }

    #[test]
    fn concurrent_saves_are_serialized() {
        let fx = fixture();
        let handles: Vec<_> = (0..6)
            .map(|i| {
                let backend = Arc::clone(&fx.backend);
                std::thread::spawn(move || {
                    let mut page = Page::new(&backend, &format!("pages/p{i}.md")).unwrap();
                    page.write(format!("page {i}"), "parallel", None).unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().expect("save thread panicked");
        }

        assert_eq!(fx.commit_count(), 6);
        let tree = crate::resolve_tree_or_fail(&fx.backend, "pages", None).unwrap();
        assert_eq!(tree.pages().unwrap().len(), 6);
    }
}
