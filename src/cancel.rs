//! Cooperative cancellation for walks

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared flag checked by the walker before every collaborator call.
///
/// Clones share the same flag, so a caller can keep one handle and move
/// another into [`WalkOptions`](crate::WalkOptions). Cancellation never
/// interrupts a call in flight; it surfaces as [`Error::Cancelled`](crate::Error)
/// at the next call boundary and is routed through the visitor like any
/// other transport failure.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let token = CancelToken::new();
        let handle = token.clone();
        assert!(!token.is_cancelled());
        handle.cancel();
        assert!(token.is_cancelled());
    }
}
