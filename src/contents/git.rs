//! Contents collaborator backed by a local git repository

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use git2::{ErrorCode, ObjectType, Oid, Repository, Tree, TreeEntry};
use tracing::debug;

use super::{ContentItem, Contents, ContentsApi, ContentsRequest, UrlScheme};
use crate::entry::EntryKind;
use crate::error::{Error, Result};

const SYMLINK_MODE: i32 = 0o120000;

/// Serves contents calls from the object database of a local repository.
///
/// Refs are resolved with rev-parse, so branches, tags, abbreviated commits
/// and expressions like `HEAD~1` all work; without a ref the repository's
/// `HEAD` is used. Only committed content is visible. The owner and repo of a
/// request are only used to build locator URLs, and tokens are ignored.
///
/// Each ref is resolved to a commit once, on first use, so a walk sees one
/// consistent snapshot even if the ref moves while it runs. Open a new
/// instance to pick up later commits.
///
/// Submodules are listed with kind [`EntryKind::Submodule`] and no content.
///
/// Tree entry names that are not valid UTF-8 are converted lossily. Such an
/// entry shows up in its parent's listing, but it cannot be addressed by
/// path: requesting it, descending into it or fetching its detail fails with
/// [`Error::NotFound`].
pub struct GitContents {
    repo: Repository,
    // ref spec -> resolved commit
    commits: Mutex<HashMap<String, Oid>>,
}

impl GitContents {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_repository(Repository::open(path)?))
    }

    /// Open the repository containing `path`, searching upwards.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_repository(Repository::discover(path)?))
    }

    pub fn from_repository(repo: Repository) -> Self {
        Self {
            repo,
            commits: Mutex::new(HashMap::new()),
        }
    }

    fn resolve_tree(&self, reference: Option<&str>) -> Result<Tree<'_>> {
        let spec = reference.unwrap_or("HEAD");
        let cached = self.commits.lock().ok().and_then(|c| c.get(spec).copied());
        let oid = match cached {
            Some(oid) => oid,
            None => {
                let oid = self.repo.revparse_single(spec)?.peel_to_commit()?.id();
                debug!(spec, commit = %oid, "resolved ref");
                if let Ok(mut commits) = self.commits.lock() {
                    commits.insert(spec.to_string(), oid);
                }
                oid
            }
        };
        Ok(self.repo.find_commit(oid)?.tree()?)
    }

    /// The ref name shown in locator URLs.
    fn display_ref(&self, reference: Option<&str>) -> String {
        if let Some(reference) = reference {
            return reference.to_string();
        }
        self.repo
            .head()
            .ok()
            .and_then(|head| head.shorthand().map(String::from))
            .unwrap_or_else(|| "HEAD".to_string())
    }

    fn list(&self, tree: &Tree<'_>, dir: &str, urls: &UrlScheme<'_>) -> Result<Vec<ContentItem>> {
        let mut items = Vec::with_capacity(tree.len());
        for entry in tree.iter() {
            let name = String::from_utf8_lossy(entry.name_bytes()).into_owned();
            let path = if dir.is_empty() {
                name
            } else {
                format!("{}/{}", dir, name)
            };
            if let Some(item) = self.item(&entry, &path, urls, false)? {
                items.push(item);
            }
        }
        Ok(items)
    }

    fn item(
        &self,
        entry: &TreeEntry<'_>,
        path: &str,
        urls: &UrlScheme<'_>,
        with_content: bool,
    ) -> Result<Option<ContentItem>> {
        let kind = match entry.kind() {
            Some(ObjectType::Tree) => EntryKind::Dir,
            Some(ObjectType::Blob) if entry.filemode() == SYMLINK_MODE => EntryKind::Symlink,
            Some(ObjectType::Blob) => EntryKind::File,
            // gitlink: the commit lives in another repository
            Some(ObjectType::Commit) => EntryKind::Submodule,
            _ => return Ok(None),
        };
        let sha = entry.id().to_string();
        let name = path.rsplit('/').next().unwrap_or(path).to_string();

        let mut item = ContentItem {
            kind,
            name,
            path: path.to_string(),
            size: 0,
            url: Some(urls.api_url(path)),
            git_url: Some(urls.git_url(kind, &sha)),
            html_url: Some(urls.html_url(kind, path)),
            download_url: matches!(kind, EntryKind::File | EntryKind::Symlink)
                .then(|| urls.download_url(path)),
            sha,
            encoding: None,
            content: None,
            target: None,
        };

        if matches!(kind, EntryKind::File | EntryKind::Symlink) {
            let blob = self.repo.find_blob(entry.id())?;
            item.size = blob.size() as u64;
            if with_content {
                match kind {
                    EntryKind::Symlink => {
                        item.target = Some(String::from_utf8_lossy(blob.content()).into_owned())
                    }
                    _ => {
                        item.encoding = Some("base64".to_string());
                        item.content = Some(STANDARD.encode(blob.content()));
                    }
                }
            }
        }
        Ok(Some(item))
    }
}

impl ContentsApi for GitContents {
    fn get_contents(&self, request: &ContentsRequest<'_>) -> Result<Contents> {
        let path = request.path.trim_matches('/');
        debug!(path, reference = ?request.reference, "reading git tree");

        let tree = self.resolve_tree(request.reference)?;
        let display_ref = self.display_ref(request.reference);
        let urls = UrlScheme {
            owner: request.owner,
            repo: request.repo,
            reference: &display_ref,
        };

        if path.is_empty() {
            return Ok(Contents::Dir(self.list(&tree, "", &urls)?));
        }

        let entry = match tree.get_path(Path::new(path)) {
            Ok(entry) => entry,
            Err(e) if e.code() == ErrorCode::NotFound => return Err(Error::not_found(path)),
            Err(e) => return Err(e.into()),
        };

        if entry.kind() == Some(ObjectType::Tree) {
            let subtree = entry.to_object(&self.repo)?.peel_to_tree()?;
            return Ok(Contents::Dir(self.list(&subtree, path, &urls)?));
        }

        self.item(&entry, path, &urls, true)?
            .map(Contents::File)
            .ok_or_else(|| Error::not_found(path))
    }
}
