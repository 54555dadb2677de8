//! The remote-content collaborator boundary
//!
//! The walker never talks to a network itself. It asks a [`ContentsApi`] for
//! the contents of one path at a time, the same way the hosted "repository
//! contents" endpoint works: a directory path yields the list of its immediate
//! children, any other path yields a single item with its content.
//!
//! - [`MemoryContents`]: an in-memory tree, with call accounting and fault injection
//! - [`GitContents`]: a local git repository read through libgit2

mod git;
mod memory;

pub use git::GitContents;
pub use memory::MemoryContents;

use std::sync::Arc;

use serde::Deserialize;

use crate::entry::EntryKind;
use crate::error::Result;

/// One item of a contents response, as the hosted API serializes it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContentItem {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub sha: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub git_url: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
}

/// A contents response: an array for directories, an object otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Contents {
    Dir(Vec<ContentItem>),
    File(ContentItem),
}

impl Contents {
    /// Parse a response body of the hosted contents endpoint.
    pub fn from_json(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }
}

/// Parameters of one contents call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentsRequest<'a> {
    pub owner: &'a str,
    pub repo: &'a str,
    /// Slash-separated path from the repository root; empty for the root.
    pub path: &'a str,
    /// Branch, tag or commit; `None` means the default branch.
    pub reference: Option<&'a str>,
    /// Access token; `None` means anonymous access.
    pub token: Option<&'a str>,
}

/// Something that can answer contents calls.
///
/// Implementations own transport, authentication, rate limiting and retries.
/// A path that does not exist must yield [`Error::NotFound`](crate::Error);
/// anything else that fails should surface as a transport-class error with
/// its message intact.
pub trait ContentsApi {
    fn get_contents(&self, request: &ContentsRequest<'_>) -> Result<Contents>;
}

impl<T: ContentsApi + ?Sized> ContentsApi for &T {
    fn get_contents(&self, request: &ContentsRequest<'_>) -> Result<Contents> {
        (**self).get_contents(request)
    }
}

impl<T: ContentsApi + ?Sized> ContentsApi for Box<T> {
    fn get_contents(&self, request: &ContentsRequest<'_>) -> Result<Contents> {
        (**self).get_contents(request)
    }
}

impl<T: ContentsApi + ?Sized> ContentsApi for Arc<T> {
    fn get_contents(&self, request: &ContentsRequest<'_>) -> Result<Contents> {
        (**self).get_contents(request)
    }
}

/// Locator URLs in the shape the hosted API uses.
pub(crate) struct UrlScheme<'a> {
    pub owner: &'a str,
    pub repo: &'a str,
    pub reference: &'a str,
}

impl UrlScheme<'_> {
    pub fn api_url(&self, path: &str) -> String {
        format!(
            "https://api.github.com/repos/{}/{}/contents/{}?ref={}",
            self.owner, self.repo, path, self.reference
        )
    }

    pub fn git_url(&self, kind: EntryKind, sha: &str) -> String {
        let object = match kind {
            EntryKind::Dir | EntryKind::Submodule => "trees",
            _ => "blobs",
        };
        format!(
            "https://api.github.com/repos/{}/{}/git/{}/{}",
            self.owner, self.repo, object, sha
        )
    }

    pub fn html_url(&self, kind: EntryKind, path: &str) -> String {
        let view = match kind {
            EntryKind::Dir | EntryKind::Submodule => "tree",
            _ => "blob",
        };
        format!(
            "https://github.com/{}/{}/{}/{}/{}",
            self.owner, self.repo, view, self.reference, path
        )
    }

    pub fn download_url(&self, path: &str) -> String {
        format!(
            "https://raw.githubusercontent.com/{}/{}/{}/{}",
            self.owner, self.repo, self.reference, path
        )
    }
}
