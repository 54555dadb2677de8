//! Walker - depth-first traversal of a repository tree over a contents API

use std::time::Instant;

use tracing::{debug, trace};

use crate::contents::{Contents, ContentsApi, ContentsRequest};
use crate::entry::Entry;
use crate::error::{Error, Result};

use super::config::WalkOptions;
use super::control::WalkControl;
use super::filter::PathFilter;
use super::utils::{base_name, join_path, normalize_path, parent_path};

/// Walks one repository through a [`ContentsApi`].
///
/// The walk is strictly sequential: one collaborator call completes before
/// the next is issued, and siblings are visited in name order. A directory
/// costs one listing call. With file detail enabled, every visited
/// non-directory entry costs one more.
pub struct Walker<'a, A: ContentsApi> {
    api: A,
    owner: String,
    repo: String,
    options: WalkOptions,
    filter: Option<Box<dyn PathFilter + 'a>>,
}

impl<'a, A: ContentsApi> Walker<'a, A> {
    pub fn new(api: A, owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            api,
            owner: owner.into(),
            repo: repo.into(),
            options: WalkOptions::default(),
            filter: None,
        }
    }

    pub fn with_options(mut self, options: WalkOptions) -> Self {
        self.options = options;
        self
    }

    /// Consult `filter` for every child before spending a call on it.
    pub fn with_filter(mut self, filter: impl PathFilter + 'a) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    /// Metadata of exactly one path.
    ///
    /// The repository root has none and yields `Ok(None)`. Anything else is
    /// looked up in its parent's listing; with file detail enabled a
    /// non-directory match is fetched again on its own to carry its detail.
    pub fn stat(&self, path: &str) -> Result<Option<Entry>> {
        let path = normalize_path(path);
        if path.is_empty() {
            return Ok(None);
        }

        let name = base_name(&path);
        let siblings = match self.fetch(parent_path(&path))? {
            Contents::Dir(items) => items,
            // The parent is a file, so nothing can live under it
            Contents::File(_) => return Err(Error::not_found(path.as_str())),
        };

        let item = siblings
            .into_iter()
            .find(|item| item.name == name)
            .ok_or_else(|| Error::not_found(path.as_str()))?;

        let entry = Entry::from_item(item, false);
        if !entry.is_dir() && self.options.file_detail {
            return self.fetch_detail(&path).map(Some);
        }
        Ok(Some(entry))
    }

    /// Immediate children of a directory, without detail, sorted by name
    /// (descending when the options ask for reverse order).
    pub fn list_children(&self, path: &str) -> Result<Vec<Entry>> {
        let path = normalize_path(path);
        let items = match self.fetch(&path)? {
            Contents::Dir(items) => items,
            Contents::File(_) => return Err(Error::NotADirectory { path }),
        };

        let mut entries: Vec<Entry> = items
            .into_iter()
            .map(|item| Entry::from_item(item, false))
            .collect();
        if self.options.reverse {
            entries.sort_by(|a, b| b.name().cmp(a.name()));
        } else {
            entries.sort_by(|a, b| a.name().cmp(b.name()));
        }
        Ok(entries)
    }

    /// Walk the tree rooted at `path`, calling `visit` for every node,
    /// `path` itself included. An empty path walks the whole repository,
    /// whose root is visited with no entry.
    ///
    /// Every failure to resolve a node is handed to `visit` together with
    /// the node's path and no entry; the visitor alone decides whether the
    /// walk goes on. A directory whose listing failed is visited once with
    /// the listing error and never descended into. Returns `Ok(())` unless a
    /// visitor aborted, in which case the abort's error is returned as is.
    pub fn walk<F>(&self, path: &str, mut visit: F) -> Result<()>
    where
        F: FnMut(&str, Option<Entry>, Option<Error>) -> WalkControl,
    {
        let path = normalize_path(path);
        let control = match self.stat(&path) {
            Err(err) => visit(&path, None, Some(err)),
            Ok(Some(entry)) if self.is_excluded(&path, &entry) => WalkControl::Continue,
            Ok(entry) => self.walk_entry(&path, entry, &mut visit),
        };

        if let WalkControl::Abort(err) = &control {
            debug!(path = %path, error = %err, "walk aborted");
        }
        control.into_result()
    }

    fn walk_entry<F>(&self, path: &str, entry: Option<Entry>, visit: &mut F) -> WalkControl
    where
        F: FnMut(&str, Option<Entry>, Option<Error>) -> WalkControl,
    {
        // The root (no entry) is a directory too
        let entry = match entry {
            Some(entry) if !entry.is_dir() => return visit(path, Some(entry), None),
            entry => entry,
        };

        let (children, list_err) = match self.list_children(path) {
            Ok(children) => (children, None),
            Err(err) => (Vec::new(), Some(err)),
        };
        let listed = list_err.is_none();
        let control = visit(path, entry, list_err);
        if !listed || !control.is_continue() {
            return control;
        }

        for child in children {
            let child_path = join_path(path, child.name());
            if self.is_excluded(&child_path, &child) {
                continue;
            }

            let child = if self.options.file_detail && !child.is_dir() {
                match self.fetch_detail(&child_path) {
                    Ok(child) => child,
                    Err(err) => match visit(&child_path, None, Some(err)) {
                        WalkControl::Abort(err) => return WalkControl::Abort(err),
                        WalkControl::Continue | WalkControl::Skip => continue,
                    },
                }
            } else {
                child
            };

            let is_dir = child.is_dir();
            match self.walk_entry(&child_path, Some(child), visit) {
                WalkControl::Continue => {}
                WalkControl::Skip if is_dir => trace!(path = %child_path, "skipped directory"),
                control => {
                    if matches!(control, WalkControl::Skip) {
                        trace!(path = %path, after = %child_path, "skipping remaining siblings");
                    }
                    return control;
                }
            }
        }
        WalkControl::Continue
    }

    fn is_excluded(&self, path: &str, entry: &Entry) -> bool {
        let excluded = self
            .filter
            .as_ref()
            .is_some_and(|f| f.is_excluded(path, entry));
        if excluded {
            trace!(path, "filtered out");
        }
        excluded
    }

    /// Fetch `path` on its own, expecting a single non-directory item.
    fn fetch_detail(&self, path: &str) -> Result<Entry> {
        match self.fetch(path)? {
            Contents::File(item) => Ok(Entry::from_item(item, true)),
            Contents::Dir(_) => Err(Error::transport(format!(
                "expected a single item at {}, got a directory listing",
                path
            ))),
        }
    }

    /// One collaborator call. Cancellation and the deadline are observed here
    /// and nowhere else.
    fn fetch(&self, path: &str) -> Result<Contents> {
        if self.options.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if self.options.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(Error::DeadlineExceeded);
        }

        debug!(
            owner = %self.owner,
            repo = %self.repo,
            path,
            reference = ?self.options.reference,
            "fetching contents"
        );
        self.api.get_contents(&ContentsRequest {
            owner: &self.owner,
            repo: &self.repo,
            path,
            reference: self.options.reference.as_deref(),
            token: self.options.token.as_deref(),
        })
    }
}

/// Walk `owner/repo` from `path` in one call.
///
/// Shorthand for building a [`Walker`] with `options` and an optional filter.
pub fn walk<A, F>(
    api: A,
    owner: &str,
    repo: &str,
    path: &str,
    options: &WalkOptions,
    visit: F,
    filter: Option<&dyn PathFilter>,
) -> Result<()>
where
    A: ContentsApi,
    F: FnMut(&str, Option<Entry>, Option<Error>) -> WalkControl,
{
    let mut walker = Walker::new(api, owner, repo).with_options(options.clone());
    if let Some(filter) = filter {
        walker = walker.with_filter(move |path: &str, entry: &Entry| filter.is_excluded(path, entry));
    }
    walker.walk(path, visit)
}
