//! Configuration for a single walk

use std::fmt;
use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::cancel::CancelToken;

/// Environment variable holding the access token read by [`WalkOptions::from_env`].
pub const TOKEN_ENV: &str = "GHWALK_GITHUB_TOKEN";
/// Environment variable holding the ref read by [`WalkOptions::from_env`].
pub const REF_ENV: &str = "GHWALK_REF";

/// Options for one walk. Every field is optional; the defaults mean anonymous
/// access, the default branch, ascending order and no file detail.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct WalkOptions {
    /// Access token handed to the collaborator with every call.
    pub token: Option<String>,
    /// Branch, tag or commit to walk.
    #[serde(rename = "ref")]
    pub reference: Option<String>,
    /// Fetch the detail payload (content, encoding, symlink target) of every
    /// visited non-directory entry. Costs one extra call per entry.
    pub file_detail: bool,
    /// Visit siblings in descending name order.
    pub reverse: bool,
    #[serde(skip)]
    pub cancel: CancelToken,
    #[serde(skip)]
    pub deadline: Option<Instant>,
}

impl WalkOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults, with the token and ref taken from the environment when set.
    pub fn from_env() -> Self {
        let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());
        Self {
            token: non_empty(TOKEN_ENV),
            reference: non_empty(REF_ENV),
            ..Self::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_ref(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_file_detail(mut self, enabled: bool) -> Self {
        self.file_detail = enabled;
        self
    }

    pub fn with_reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Deadline `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }
}

impl fmt::Debug for WalkOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalkOptions")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("reference", &self.reference)
            .field("file_detail", &self.file_detail)
            .field("reverse", &self.reverse)
            .field("cancelled", &self.cancel.is_cancelled())
            .field("deadline", &self.deadline)
            .finish()
    }
}
