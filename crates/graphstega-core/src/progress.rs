//! Advisory progress reporting and cooperative cancellation.
//!
//! The engine is single-threaded; a caller that wants to cancel it hands in
//! a [`CancelToken`] clone and trips it from another thread. Cancellation is
//! polled at the top of each outer vertex loop in edge finding and reserve
//! matching, and between matching batches. Progress callbacks are purely
//! advisory and may be dropped by the receiver.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;

use crate::error::EngineError;

/// Progress ticks emitted per phase pass.
pub(crate) const PROGRESS_GRANULARITY: usize = 100;

/// Pipeline phase a progress tick belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Scanning the spatial index for candidate partner samples.
    EdgeSearch,
    /// Pairing leftover vertices against reserves.
    ReserveSearch,
    /// Forcing residual vertices to their targets.
    Adjust,
}

/// Receiver of advisory progress ticks.
pub trait Reporter {
    /// `completed` of `total` vertices processed in `phase`.
    fn tick(&self, phase: Phase, completed: usize, total: usize);
}

/// Reporter that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl Reporter for NoopReporter {
    fn tick(&self, _phase: Phase, _completed: usize, _total: usize) {}
}

/// Shared flag for cooperative cancellation.
#[derive(Debug, Default, Clone)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; the engine observes it at its next poll point.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Poll point: error out if cancellation was requested.
    pub(crate) fn check(&self) -> Result<(), EngineError> {
        if self.is_cancelled() {
            Err(EngineError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_starts_clear() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        assert_eq!(token.check(), Ok(()));
    }

    #[test]
    fn test_cancel_is_visible_through_clones() {
        let token = CancelToken::new();
        let other = token.clone();
        other.cancel();
        assert!(token.is_cancelled());
        assert_eq!(token.check(), Err(EngineError::Cancelled));
    }
}
