//! In-memory contents collaborator

use std::collections::HashMap;
use std::sync::Mutex;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use git2::{ObjectType, Oid};

use super::{ContentItem, Contents, ContentsApi, ContentsRequest, UrlScheme};
use crate::entry::EntryKind;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
enum Node {
    File(Vec<u8>),
    Dir,
    Symlink(String),
}

/// A repository tree held in memory.
///
/// Listings come back in insertion order, like an API that does not promise
/// any order; the walker sorts them itself. Every call is recorded so tests
/// can assert how many round trips a walk costs, and any path can be made to
/// fail with a transport error.
///
/// Symlinks are always reported as symlinks with their target, even when the
/// target is a regular file.
///
/// Directory hashes cover the whole subtree. They are computed on first use
/// and cached until the tree changes.
#[derive(Debug)]
pub struct MemoryContents {
    nodes: Vec<(String, Node)>,
    index: HashMap<String, usize>,
    // parent path -> child indices, in insertion order
    children: HashMap<String, Vec<usize>>,
    hashes: Mutex<HashMap<String, String>>,
    failures: HashMap<String, String>,
    token: Option<String>,
    default_branch: String,
    calls: Mutex<Vec<String>>,
}

impl Default for MemoryContents {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            children: HashMap::new(),
            hashes: Mutex::new(HashMap::new()),
            failures: HashMap::new(),
            token: None,
            default_branch: "main".to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl MemoryContents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, creating missing parent directories.
    pub fn file(mut self, path: &str, content: impl AsRef<[u8]>) -> Self {
        self.insert(path, Node::File(content.as_ref().to_vec()));
        self
    }

    /// Add a directory, creating missing parent directories.
    pub fn dir(mut self, path: &str) -> Self {
        self.insert(path, Node::Dir);
        self
    }

    /// Add a symlink pointing at `target`, creating missing parent directories.
    pub fn symlink(mut self, path: &str, target: &str) -> Self {
        self.insert(path, Node::Symlink(target.to_string()));
        self
    }

    /// Make every call addressed at `path` fail with a transport error.
    pub fn fail_on(mut self, path: &str, message: &str) -> Self {
        self.failures.insert(path.to_string(), message.to_string());
        self
    }

    /// Reject calls that do not present this token.
    pub fn require_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn with_default_branch(mut self, branch: &str) -> Self {
        self.default_branch = branch.to_string();
        self
    }

    /// Paths of every call made so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }

    pub fn reset_calls(&self) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.clear();
        }
    }

    fn insert(&mut self, path: &str, node: Node) {
        let path = path.trim_matches('/');
        if path.is_empty() {
            return;
        }
        if let Some((parent, _)) = path.rsplit_once('/') {
            if !self.index.contains_key(parent) {
                self.insert(parent, Node::Dir);
            }
        }
        match self.index.get(path) {
            Some(&i) => self.nodes[i].1 = node,
            None => {
                let i = self.nodes.len();
                self.index.insert(path.to_string(), i);
                self.children
                    .entry(parent_of(path).to_string())
                    .or_default()
                    .push(i);
                self.nodes.push((path.to_string(), node));
            }
        }
        if let Ok(hashes) = self.hashes.get_mut() {
            hashes.clear();
        }
    }

    fn children<'a>(&'a self, dir: &str) -> impl Iterator<Item = &'a (String, Node)> + 'a {
        self.children
            .get(dir)
            .into_iter()
            .flatten()
            .map(|&i| &self.nodes[i])
    }

    fn sha(&self, path: &str, node: &Node) -> String {
        if let Some(sha) = self.hashes.lock().ok().and_then(|h| h.get(path).cloned()) {
            return sha;
        }
        let bytes = match node {
            Node::File(data) => data.clone(),
            Node::Symlink(target) => target.as_bytes().to_vec(),
            Node::Dir => {
                let mut lines: Vec<String> = self
                    .children(path)
                    .map(|(child, node)| format!("{} {}", child, self.sha(child, node)))
                    .collect();
                lines.sort();
                lines.join("\n").into_bytes()
            }
        };
        let sha = Oid::hash_object(ObjectType::Blob, &bytes)
            .map(|oid| oid.to_string())
            .unwrap_or_default();
        if let Ok(mut hashes) = self.hashes.lock() {
            hashes.insert(path.to_string(), sha.clone());
        }
        sha
    }

    fn item(&self, path: &str, node: &Node, urls: &UrlScheme<'_>, with_content: bool) -> ContentItem {
        let (kind, size) = match node {
            Node::File(data) => (EntryKind::File, data.len() as u64),
            Node::Dir => (EntryKind::Dir, 0),
            Node::Symlink(target) => (EntryKind::Symlink, target.len() as u64),
        };
        let sha = self.sha(path, node);
        let mut item = ContentItem {
            kind,
            name: path.rsplit('/').next().unwrap_or(path).to_string(),
            path: path.to_string(),
            size,
            url: Some(urls.api_url(path)),
            git_url: Some(urls.git_url(kind, &sha)),
            html_url: Some(urls.html_url(kind, path)),
            download_url: (kind != EntryKind::Dir).then(|| urls.download_url(path)),
            sha,
            encoding: None,
            content: None,
            target: None,
        };
        if with_content {
            match node {
                Node::File(data) => {
                    item.encoding = Some("base64".to_string());
                    item.content = Some(STANDARD.encode(data));
                }
                Node::Symlink(target) => item.target = Some(target.clone()),
                Node::Dir => {}
            }
        }
        item
    }
}

fn parent_of(path: &str) -> &str {
    path.rsplit_once('/').map(|(parent, _)| parent).unwrap_or("")
}

impl ContentsApi for MemoryContents {
    fn get_contents(&self, request: &ContentsRequest<'_>) -> Result<Contents> {
        let path = request.path.trim_matches('/');
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(path.to_string());
        }

        if let Some(expected) = &self.token {
            if request.token != Some(expected.as_str()) {
                return Err(Error::transport("Bad credentials"));
            }
        }
        if let Some(message) = self.failures.get(path) {
            return Err(Error::transport(message.clone()));
        }

        let urls = UrlScheme {
            owner: request.owner,
            repo: request.repo,
            reference: request.reference.unwrap_or(&self.default_branch),
        };

        if path.is_empty() {
            let items = self
                .children("")
                .map(|(child, node)| self.item(child, node, &urls, false))
                .collect();
            return Ok(Contents::Dir(items));
        }

        let node = self
            .index
            .get(path)
            .map(|&i| &self.nodes[i].1)
            .ok_or_else(|| Error::not_found(path))?;

        match node {
            Node::Dir => Ok(Contents::Dir(
                self.children(path)
                    .map(|(child, node)| self.item(child, node, &urls, false))
                    .collect(),
            )),
            _ => Ok(Contents::File(self.item(path, node, &urls, true))),
        }
    }
}
