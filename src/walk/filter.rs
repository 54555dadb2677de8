//! Pre-fetch filtering for tree walking

use glob::{MatchOptions, Pattern};

use crate::entry::Entry;
use crate::error::Result;

/// Decides, from the listing alone, whether a child is worth visiting.
///
/// Returning `true` vetoes the child: it is neither visited nor descended
/// into, and no collaborator call is spent on it.
pub trait PathFilter {
    fn is_excluded(&self, path: &str, entry: &Entry) -> bool;
}

impl<F> PathFilter for F
where
    F: Fn(&str, &Entry) -> bool,
{
    fn is_excluded(&self, path: &str, entry: &Entry) -> bool {
        self(path, entry)
    }
}

/// Vetoes children whose name or full path matches any of a set of globs.
///
/// Each pattern is tried against the entry name and against the full path.
/// In the path match `*` does not cross `/`, so `*.md` hides every markdown
/// file while `docs/*` hides only the direct children of `docs`.
#[derive(Debug, Clone, Default)]
pub struct GlobFilter {
    patterns: Vec<Pattern>,
}

impl GlobFilter {
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| Pattern::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn matches(&self, path: &str, name: &str) -> bool {
        let path_options = MatchOptions {
            require_literal_separator: true,
            ..MatchOptions::new()
        };
        self.patterns
            .iter()
            .any(|p| p.matches(name) || p.matches_with(path, path_options))
    }
}

impl PathFilter for GlobFilter {
    fn is_excluded(&self, path: &str, entry: &Entry) -> bool {
        self.matches(path, entry.name())
    }
}
