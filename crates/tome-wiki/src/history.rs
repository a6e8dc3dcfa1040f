//! Memoized history lookups for one object.

use once_cell::unsync::OnceCell;
use tome_repo::{Commit, VersionBackend};

use crate::error::{WikiError, WikiResult};

/// Most commits [`HistoryCache::history`] will list for a path.
pub const HISTORY_LIMIT: usize = 30;

/// Per-object cache of history queries.
///
/// Values are computed on first access and kept until [`clear`] is called.
/// Nothing invalidates them automatically.
///
/// [`clear`]: HistoryCache::clear
#[derive(Clone, Debug, Default)]
pub struct HistoryCache {
    history: OnceCell<Vec<Commit>>,
    /// `(latest, prev)` as seen from the object's own commit.
    latest_prev: OnceCell<(Option<Commit>, Option<Commit>)>,
}

impl HistoryCache {
    /// Up to [`HISTORY_LIMIT`] commits touching `path`, newest first,
    /// starting at HEAD.
    pub fn history(&self, repo: &dyn VersionBackend, path: &str) -> WikiResult<&[Commit]> {
        let history = self
            .history
            .get_or_try_init(|| repo.history_for_path(path, Some(HISTORY_LIMIT), None))?;
        Ok(history)
    }

    /// Newest commit touching `path` at or before `commit`.
    pub fn latest(
        &self,
        repo: &dyn VersionBackend,
        path: &str,
        commit: Option<&Commit>,
    ) -> WikiResult<Option<&Commit>> {
        Ok(self.latest_prev(repo, path, commit)?.0.as_ref())
    }

    /// The commit touching `path` before [`latest`](Self::latest).
    pub fn prev(
        &self,
        repo: &dyn VersionBackend,
        path: &str,
        commit: Option<&Commit>,
    ) -> WikiResult<Option<&Commit>> {
        Ok(self.latest_prev(repo, path, commit)?.1.as_ref())
    }

    fn latest_prev(
        &self,
        repo: &dyn VersionBackend,
        path: &str,
        commit: Option<&Commit>,
    ) -> WikiResult<&(Option<Commit>, Option<Commit>)> {
        let pair = self.latest_prev.get_or_try_init(|| {
            let Some(commit) = commit else {
                return Ok((None, None));
            };
            let mut commits = repo.history_for_path(path, Some(2), Some(commit))?.into_iter();
            Ok::<_, WikiError>((commits.next(), commits.next()))
        })?;
        Ok(pair)
    }

    /// The history entry just newer than `commit`.
    ///
    /// Finds the first entry (newest to oldest) dated at or before `commit`
    /// and returns the entry before it. When that is the first entry, or no
    /// entry qualifies, the oldest entry of the history is returned instead;
    /// a single-commit history therefore yields that commit.
    pub fn next(
        &self,
        repo: &dyn VersionBackend,
        path: &str,
        commit: Option<&Commit>,
    ) -> WikiResult<Option<&Commit>> {
        let Some(commit) = commit else {
            return Ok(None);
        };
        let history = self.history(repo, path)?;
        let found = history
            .iter()
            .position(|c| c.committer_date <= commit.committer_date);
        Ok(match found {
            Some(i) if i > 0 => history.get(i - 1),
            _ => history.last(),
        })
    }

    pub fn clear(&mut self) {
        self.history.take();
        self.latest_prev.take();
    }

    pub fn is_loaded(&self) -> bool {
        self.history.get().is_some() || self.latest_prev.get().is_some()
    }
}
