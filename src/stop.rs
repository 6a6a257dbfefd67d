//! Process-wide stop flag.
//!
//! A thin cancellation token over `Arc<AtomicBool>`. The Ctrl+C handler
//! raises it exactly once (further stores are idempotent); the scheduler and
//! the auxiliary mover each observe it at their poll boundaries. This is the
//! only mutable state shared between the two duty cycles.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared shutdown request, cheap to clone into each loop.
#[derive(Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests shutdown. Safe to call from a signal handler thread and safe
    /// to call more than once.
    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// True once shutdown has been requested.
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unset() {
        assert!(!StopFlag::new().is_stopped());
    }

    #[test]
    fn request_is_visible_through_clones() {
        let flag = StopFlag::new();
        let seen_by_loop = flag.clone();
        flag.request_stop();
        assert!(seen_by_loop.is_stopped());
    }

    #[test]
    fn repeated_requests_are_idempotent() {
        let flag = StopFlag::new();
        flag.request_stop();
        flag.request_stop();
        assert!(flag.is_stopped());
    }
}
