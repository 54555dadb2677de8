//! Test utilities: sample trees and temporary git repositories.
//!
//! This module is only compiled for tests and benchmarks.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

use crate::contents::MemoryContents;
use crate::entry::{Entry, EntryKind};
use crate::error::Error;

/// The `testdata` tree used throughout the tests:
///
/// ```text
/// README.md
/// testdata/
///   a
///   b
///   dir/
///     c
///   link_dir -> dir
/// ```
///
/// Entries are inserted out of order so listings need sorting.
pub fn sample_tree() -> MemoryContents {
    MemoryContents::new()
        .file("testdata/b", "b\n")
        .symlink("testdata/link_dir", "dir")
        .file("testdata/dir/c", "c\n")
        .file("testdata/a", "a\n")
        .file("README.md", "# ghwalk\n")
}

/// One visitor invocation, flattened for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    pub path: String,
    pub kind: Option<EntryKind>,
    pub error: Option<String>,
}

impl Visit {
    pub fn new(path: &str, entry: Option<&Entry>, error: Option<&Error>) -> Self {
        Self {
            path: path.to_string(),
            kind: entry.map(Entry::kind),
            error: error.map(|e| e.to_string()),
        }
    }
}

/// Paths of a list of visits, in order.
pub fn paths(visits: &[Visit]) -> Vec<&str> {
    visits.iter().map(|v| v.path.as_str()).collect()
}

/// A temporary git repository for testing.
///
/// Provides methods for creating files and symlinks, staging and committing.
/// The repository is automatically cleaned up when dropped.
pub struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    /// Create a new temporary directory with git initialized.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let repo = Self { dir };
        repo.git(&["init", "--initial-branch=main"]);
        repo.git(&["config", "user.email", "test@test.com"]);
        repo.git(&["config", "user.name", "Test"]);
        repo
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Add a file and stage it.
    ///
    /// Creates parent directories as needed.
    pub fn add_file(&self, path: &str, content: &str) -> PathBuf {
        let full_path = self.dir.path().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&full_path, content).expect("Failed to write file");
        self.git(&["add", path]);
        full_path
    }

    /// Add a symlink and stage it.
    #[cfg(unix)]
    pub fn add_symlink(&self, path: &str, target: &str) -> PathBuf {
        let full_path = self.dir.path().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::os::unix::fs::symlink(target, &full_path).expect("Failed to create symlink");
        self.git(&["add", path]);
        full_path
    }

    /// Record a submodule at `path` pointing at `commit`, without cloning it.
    pub fn add_gitlink(&self, path: &str, commit: &str) {
        let cacheinfo = format!("160000,{},{}", commit, path);
        self.git(&["update-index", "--add", "--cacheinfo", &cacheinfo]);
    }

    /// Stage everything in the working tree, for files created directly
    /// under [`TestRepo::path`].
    pub fn stage_all(&self) {
        self.git(&["add", "--all"]);
    }

    /// Create a commit with the given message.
    pub fn commit(&self, message: &str) {
        self.git(&["commit", "-m", message, "--allow-empty"]);
    }

    /// Tag the current commit.
    pub fn tag(&self, name: &str) {
        self.git(&["tag", name]);
    }

    /// Run git in the repository, panicking with its stderr if it fails.
    fn git(&self, args: &[&str]) {
        let output = Command::new("git")
            .args(args)
            .current_dir(self.dir.path())
            .output()
            .expect("Failed to run git");
        assert!(
            output.status.success(),
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}
