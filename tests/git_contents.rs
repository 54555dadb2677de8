//! Walks over a real git repository
#![cfg(unix)]

use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;

use ghwalk::test_utils::{TestRepo, Visit, paths};
use ghwalk::{EntryKind, Error, GitContents, WalkControl, WalkOptions, Walker};

fn sample_repo() -> TestRepo {
    let repo = TestRepo::new();
    repo.add_file("README.md", "# ghwalk\n");
    repo.add_file("testdata/b", "b\n");
    repo.add_file("testdata/a", "a\n");
    repo.add_file("testdata/dir/c", "c\n");
    repo.add_symlink("testdata/link_dir", "dir");
    repo.commit("initial");
    repo
}

fn record(walker: &Walker<'_, GitContents>, path: &str) -> Vec<Visit> {
    let mut visits = Vec::new();
    walker
        .walk(path, |path, entry, err| {
            visits.push(Visit::new(path, entry.as_ref(), err.as_ref()));
            WalkControl::Continue
        })
        .unwrap();
    visits
}

#[test]
fn test_walk_git_repository() {
    let repo = sample_repo();
    let walker = Walker::new(GitContents::open(repo.path()).unwrap(), "magodo", "ghwalk");

    let visits = record(&walker, "testdata");
    assert_eq!(
        paths(&visits),
        vec![
            "testdata",
            "testdata/a",
            "testdata/b",
            "testdata/dir",
            "testdata/dir/c",
            "testdata/link_dir",
        ]
    );
    assert_eq!(visits[3].kind, Some(EntryKind::Dir));
    assert_eq!(visits[5].kind, Some(EntryKind::Symlink));
    assert!(visits.iter().all(|v| v.error.is_none()));
}

#[test]
fn test_walk_git_repository_root() {
    let repo = sample_repo();
    let walker = Walker::new(GitContents::open(repo.path()).unwrap(), "magodo", "ghwalk")
        .with_options(WalkOptions::new().with_reverse(true));

    let visits = record(&walker, "");
    assert_eq!(
        paths(&visits),
        vec![
            "",
            "testdata",
            "testdata/link_dir",
            "testdata/dir",
            "testdata/dir/c",
            "testdata/b",
            "testdata/a",
            "README.md",
        ]
    );
}

#[test]
fn test_git_file_detail() {
    let repo = sample_repo();
    let walker = Walker::new(GitContents::open(repo.path()).unwrap(), "magodo", "ghwalk")
        .with_options(WalkOptions::new().with_file_detail(true));

    let a = walker.stat("testdata/a").unwrap().unwrap();
    assert_eq!(a.size(), 2);
    assert_eq!(a.content().unwrap(), "a\n");
    // git blob hash of "a\n"
    assert_eq!(a.sha(), "78981922613b2afb6025042ff6bd878ac1994e85");

    let link = walker.stat("testdata/link_dir").unwrap().unwrap();
    assert_eq!(link.kind(), EntryKind::Symlink);
    assert_eq!(link.target(), Some("dir"));
}

#[test]
fn test_git_walk_at_ref() {
    let repo = sample_repo();
    repo.tag("v1");
    repo.add_file("testdata/new", "new\n");
    repo.commit("add new");

    let head = Walker::new(GitContents::open(repo.path()).unwrap(), "magodo", "ghwalk");
    assert!(paths(&record(&head, "testdata")).contains(&"testdata/new"));

    let tagged = Walker::new(GitContents::open(repo.path()).unwrap(), "magodo", "ghwalk")
        .with_options(WalkOptions::new().with_ref("v1"));
    let visits = record(&tagged, "testdata");
    assert!(!paths(&visits).contains(&"testdata/new"));
    assert_eq!(visits.len(), 6);

    let a = tagged.stat("testdata/a").unwrap().unwrap();
    assert_eq!(
        a.locators().html_url,
        "https://github.com/magodo/ghwalk/blob/v1/testdata/a"
    );
}

#[test]
fn test_git_missing_path_and_ref() {
    let repo = sample_repo();
    let walker = Walker::new(GitContents::open(repo.path()).unwrap(), "magodo", "ghwalk");

    let err = walker.stat("testdata/non_existent").unwrap_err();
    assert!(err.is_not_found());

    let bad_ref = Walker::new(GitContents::open(repo.path()).unwrap(), "magodo", "ghwalk")
        .with_options(WalkOptions::new().with_ref("no-such-branch"));
    let mut errors = Vec::new();
    let result = bad_ref.walk("testdata", |_, _, err| {
        if let Some(err) = err {
            errors.push(err);
        }
        WalkControl::Skip
    });
    assert!(result.is_ok());
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], Error::Git(_)));
    assert!(errors[0].is_transport());
}

#[test]
fn test_discover_from_subdirectory() {
    let repo = sample_repo();
    let api = GitContents::discover(repo.path().join("testdata/dir")).unwrap();
    let walker = Walker::new(api, "magodo", "ghwalk");

    // the whole repository is served, not just the starting directory
    let visits = record(&walker, "");
    assert_eq!(visits.len(), 8);
    assert!(paths(&visits).contains(&"README.md"));
}

#[test]
fn test_ref_is_resolved_once_per_instance() {
    let repo = sample_repo();
    let pinned = Walker::new(GitContents::open(repo.path()).unwrap(), "magodo", "ghwalk");
    assert_eq!(record(&pinned, "testdata").len(), 6);

    repo.add_file("testdata/new", "new\n");
    repo.commit("add new");

    let visits = record(&pinned, "testdata");
    assert!(!paths(&visits).contains(&"testdata/new"));
    assert_eq!(visits.len(), 6);

    let fresh = Walker::new(GitContents::open(repo.path()).unwrap(), "magodo", "ghwalk");
    assert!(paths(&record(&fresh, "testdata")).contains(&"testdata/new"));
}

#[test]
fn test_submodule_is_listed_as_a_leaf() {
    let commit = "0123456789abcdef0123456789abcdef01234567";
    let repo = TestRepo::new();
    repo.add_file("README.md", "# ghwalk\n");
    repo.add_gitlink("vendor/lib", commit);
    repo.commit("add submodule");

    let walker = Walker::new(GitContents::open(repo.path()).unwrap(), "magodo", "ghwalk")
        .with_options(WalkOptions::new().with_file_detail(true));
    let mut entries = Vec::new();
    walker
        .walk("", |path, entry, err| {
            assert!(err.is_none(), "{path}: {err:?}");
            entries.extend(entry);
            WalkControl::Continue
        })
        .unwrap();

    let kinds: Vec<_> = entries.iter().map(|e| (e.path(), e.kind())).collect();
    assert_eq!(
        kinds,
        vec![
            ("README.md", EntryKind::File),
            ("vendor", EntryKind::Dir),
            ("vendor/lib", EntryKind::Submodule),
        ]
    );
    let lib = &entries[2];
    assert_eq!(lib.sha(), commit);
    assert_eq!(lib.size(), 0);
    assert!(lib.locators().git_url.contains("/git/trees/"));
    assert!(matches!(lib.content(), Err(Error::MissingDetail { .. })));
}

#[test]
fn test_non_utf8_name_is_listed_but_not_addressable() {
    let repo = sample_repo();
    let raw = repo.path().join("testdata").join(OsStr::from_bytes(b"bad\xff"));
    std::fs::write(raw, "x\n").unwrap();
    repo.stage_all();
    repo.commit("non-UTF-8 name");

    let lossy = "testdata/bad\u{FFFD}";
    let walker = Walker::new(GitContents::open(repo.path()).unwrap(), "magodo", "ghwalk");
    let visits = record(&walker, "testdata");
    let listed = visits.iter().find(|v| v.path == lossy).unwrap();
    assert_eq!(listed.kind, Some(EntryKind::File));
    assert!(listed.error.is_none());

    // the detail call addresses the lossy path, which git cannot find
    let detailed = Walker::new(GitContents::open(repo.path()).unwrap(), "magodo", "ghwalk")
        .with_options(WalkOptions::new().with_file_detail(true));
    let mut failed = Vec::new();
    let mut visited = 0;
    detailed
        .walk("testdata", |path, _, err| {
            visited += 1;
            if let Some(err) = err {
                assert!(err.is_not_found());
                failed.push(path.to_string());
            }
            WalkControl::Continue
        })
        .unwrap();
    assert_eq!(failed, vec![lossy]);
    assert_eq!(visited, 7);
}
