//! Metadata for one node of a repository tree
//!
//! An [`Entry`] comes in two tiers. Directory listings produce the cheap tier:
//! kind, name, path, size, hash and locators. Asking for file detail costs one
//! more collaborator call per file and adds a [`Detail`] payload with the
//! (possibly encoded) content, the symlink target and the raw download URL.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::contents::ContentItem;
use crate::error::{Error, Result};

/// Kind of a repository tree node.
///
/// Only directories are descended into; every other kind is a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    /// A git submodule; its content lives in another repository.
    Submodule,
    /// Any type string the collaborator reports that is not known here.
    #[serde(other)]
    Other,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Dir => "dir",
            EntryKind::Symlink => "symlink",
            EntryKind::Submodule => "submodule",
            EntryKind::Other => "other",
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the different representations of an entry live.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locators {
    /// Contents API URL
    pub url: String,
    /// Git object URL
    pub git_url: String,
    /// Browser URL
    pub html_url: String,
}

/// File-only payload, present only when file detail was requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detail {
    /// Only set for symlinks whose target is not a regular file.
    pub target: Option<String>,
    /// Only set for files.
    pub encoding: Option<String>,
    /// Only set for files. May be encoded; use [`Entry::content`].
    pub content: Option<String>,
    pub download_url: Option<String>,
}

/// One node of the remote tree. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    kind: EntryKind,
    name: String,
    path: String,
    size: u64,
    sha: String,
    locators: Locators,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<Detail>,
}

impl Entry {
    /// Build a listing-tier entry (no detail payload).
    pub fn new(
        kind: EntryKind,
        name: impl Into<String>,
        path: impl Into<String>,
        size: u64,
        sha: impl Into<String>,
        locators: Locators,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            path: path.into(),
            size,
            sha: sha.into(),
            locators,
            detail: None,
        }
    }

    /// Attach a detail payload. Directories never carry one, so this is a
    /// no-op for them; fields that do not apply to the kind are dropped.
    pub fn with_detail(mut self, detail: Detail) -> Self {
        self.detail = match self.kind {
            EntryKind::Dir => None,
            EntryKind::File => Some(Detail {
                target: None,
                ..detail
            }),
            EntryKind::Symlink => Some(Detail {
                encoding: None,
                content: None,
                ..detail
            }),
            EntryKind::Submodule | EntryKind::Other => Some(Detail {
                download_url: detail.download_url,
                ..Detail::default()
            }),
        };
        self
    }

    /// Convert a wire item, keeping its file-only fields when `include_detail`.
    pub fn from_item(item: ContentItem, include_detail: bool) -> Self {
        let entry = Entry::new(
            item.kind,
            item.name,
            item.path,
            item.size,
            item.sha,
            Locators {
                url: item.url.unwrap_or_default(),
                git_url: item.git_url.unwrap_or_default(),
                html_url: item.html_url.unwrap_or_default(),
            },
        );
        if !include_detail {
            return entry;
        }
        entry.with_detail(Detail {
            target: item.target,
            encoding: item.encoding,
            content: item.content,
            download_url: item.download_url,
        })
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn sha(&self) -> &str {
        &self.sha
    }

    pub fn locators(&self) -> &Locators {
        &self.locators
    }

    pub fn detail(&self) -> Option<&Detail> {
        self.detail.as_ref()
    }

    /// Symlink target, when detail was fetched and the target is not a regular file.
    pub fn target(&self) -> Option<&str> {
        self.detail.as_ref()?.target.as_deref()
    }

    /// Decoded file content as text.
    ///
    /// Fails with [`Error::MissingDetail`] when the entry carries no content
    /// (directories, symlinks, or walks without file detail) and with
    /// [`Error::Decode`] when the encoding is unknown or the payload is not
    /// valid for it.
    pub fn content(&self) -> Result<String> {
        let bytes = self.content_bytes()?;
        String::from_utf8(bytes).map_err(|e| Error::Decode {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    /// Decoded file content as raw bytes, for binary files.
    pub fn content_bytes(&self) -> Result<Vec<u8>> {
        let (encoding, content) = self
            .detail
            .as_ref()
            .and_then(|d| d.content.as_deref().map(|c| (d.encoding.as_deref(), c)))
            .ok_or_else(|| Error::MissingDetail {
                path: self.path.clone(),
            })?;

        match encoding {
            None | Some("") => Ok(content.as_bytes().to_vec()),
            Some("base64") => {
                // The contents API wraps base64 payloads at 60 columns
                let compact: String = content.split_ascii_whitespace().collect();
                STANDARD.decode(compact).map_err(|e| Error::Decode {
                    path: self.path.clone(),
                    reason: e.to_string(),
                })
            }
            Some(other) => Err(Error::Decode {
                path: self.path.clone(),
                reason: format!("unsupported content encoding: {}", other),
            }),
        }
    }
}
