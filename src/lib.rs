//! ghwalk - walk a remote repository tree like a local directory

pub mod cancel;
pub mod contents;
pub mod entry;
pub mod error;
pub mod walk;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use cancel::CancelToken;
pub use contents::{ContentItem, Contents, ContentsApi, ContentsRequest, GitContents, MemoryContents};
pub use entry::{Detail, Entry, EntryKind, Locators};
pub use error::{Error, Result};
pub use walk::{GlobFilter, PathFilter, WalkControl, WalkOptions, Walker, walk};
