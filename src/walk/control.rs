//! Visitor return values

use crate::error::{BoxError, Error};

/// What a visitor wants the walk to do next.
#[derive(Debug)]
#[must_use]
pub enum WalkControl {
    /// Keep going.
    Continue,
    /// Prune. On a directory this skips its contents; on anything else it
    /// skips the remaining siblings in the containing directory. Never
    /// surfaces as an error from [`Walker::walk`](crate::Walker::walk).
    Skip,
    /// Stop the whole walk and return this error.
    Abort(Error),
}

impl WalkControl {
    /// Abort with a caller-defined cause.
    pub fn abort(cause: impl Into<BoxError>) -> Self {
        WalkControl::Abort(Error::visitor(cause))
    }

    pub fn is_continue(&self) -> bool {
        matches!(self, WalkControl::Continue)
    }

    /// Final outcome of a walk: only an abort is an error.
    pub fn into_result(self) -> Result<(), Error> {
        match self {
            WalkControl::Continue | WalkControl::Skip => Ok(()),
            WalkControl::Abort(err) => Err(err),
        }
    }
}
