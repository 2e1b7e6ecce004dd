//! Poll context
//!
//! Carries the caller's deadline and cancellation signal into the polling
//! driver and into each poll attempt.

use std::time::Duration;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::error::PollingError;

// Roughly 30 years; deadlines past this are clamped.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// `now + timeout`, clamped to the far future instead of overflowing
fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout).unwrap_or_else(|| now + FAR_FUTURE)
}

/// Deadline and cancellation scope for a polling operation
///
/// Cloning shares the same cancellation token.
#[derive(Debug, Clone, Default)]
pub struct PollContext {
    deadline: Option<Instant>,
    token: CancellationToken,
}

impl PollContext {
    /// A context with no deadline that is only done when cancelled
    pub fn background() -> Self {
        Self::default()
    }

    /// A context that expires `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(deadline_after(timeout))
    }

    /// A context that expires at `deadline`
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            token: CancellationToken::new(),
        }
    }

    /// Derives a child context expiring after `timeout` or when this one is done
    ///
    /// Cancelling the child does not cancel the parent.
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        let candidate = deadline_after(timeout);
        let deadline = match self.deadline {
            Some(parent) if parent < candidate => parent,
            _ => candidate,
        };
        Self {
            deadline: Some(deadline),
            token: self.token.child_token(),
        }
    }

    /// The deadline, if one was set
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Cancels this context and every child derived from it
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns the reason this context is done, or `None` while it is live
    pub fn err(&self) -> Option<PollingError> {
        if self.token.is_cancelled() {
            return Some(PollingError::ContextCancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(PollingError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Returns true once cancelled or past the deadline
    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Waits until the context is done and returns why
    pub async fn done(&self) -> PollingError {
        match self.deadline {
            Some(deadline) => tokio::select! {
                _ = self.token.cancelled() => PollingError::ContextCancelled,
                _ = time::sleep_until(deadline) => PollingError::DeadlineExceeded,
            },
            None => {
                self.token.cancelled().await;
                PollingError::ContextCancelled
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_has_no_deadline() {
        let ctx = PollContext::background();
        assert!(ctx.deadline().is_none());
        assert!(!ctx.is_done());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_expires() {
        let ctx = PollContext::with_timeout(Duration::from_secs(5));
        assert!(ctx.err().is_none());

        let err = ctx.done().await;
        assert!(matches!(err, PollingError::DeadlineExceeded));
        assert!(matches!(ctx.err(), Some(PollingError::DeadlineExceeded)));
    }

    #[tokio::test]
    async fn test_cancel_wins_over_deadline() {
        let ctx = PollContext::with_timeout(Duration::from_secs(3600));
        ctx.cancel();
        assert!(matches!(ctx.done().await, PollingError::ContextCancelled));
        assert!(ctx.is_done());
    }

    #[tokio::test(start_paused = true)]
    async fn test_child_inherits_earlier_deadline() {
        let parent = PollContext::with_timeout(Duration::from_secs(10));
        let child = parent.child_with_timeout(Duration::from_secs(60));
        assert_eq!(child.deadline(), parent.deadline());

        let shorter = parent.child_with_timeout(Duration::from_secs(1));
        assert!(shorter.deadline() < parent.deadline());
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_timeout_is_clamped() {
        let ctx = PollContext::with_timeout(Duration::from_secs(u64::MAX));
        assert!(ctx.deadline().is_some());
        assert!(!ctx.is_done());

        let child = ctx.child_with_timeout(Duration::MAX);
        assert_eq!(child.deadline(), ctx.deadline());

        let short = PollContext::with_timeout(Duration::from_secs(1));
        let err = tokio::select! {
            err = ctx.done() => err,
            err = short.done() => err,
        };
        assert!(matches!(err, PollingError::DeadlineExceeded));
        assert!(!ctx.is_done());
    }

    #[tokio::test]
    async fn test_parent_cancel_propagates_to_child() {
        let parent = PollContext::with_timeout(Duration::from_secs(60));
        let child = parent.child_with_timeout(Duration::from_secs(60));

        child.cancel();
        assert!(!parent.is_done());

        let sibling = parent.child_with_timeout(Duration::from_secs(60));
        parent.cancel();
        assert!(matches!(sibling.err(), Some(PollingError::ContextCancelled)));
    }
}
