//! Deadline-bound execution context shared by every branch of one dispatch.

use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Cancellation scope for a single dispatch.
///
/// The context is cancelled when its deadline elapses or when [`cancel`](Self::cancel)
/// is called, whichever happens first. Clones share the same token and deadline.
#[derive(Debug, Clone)]
pub struct RequestContext {
    token: CancellationToken,
    deadline: Instant,
}

impl RequestContext {
    /// Creates a context whose deadline is `budget` from now.
    #[must_use]
    pub fn with_timeout(budget: Duration) -> Self {
        Self { token: CancellationToken::new(), deadline: Instant::now() + budget }
    }

    #[must_use]
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Time left before the deadline, saturating at zero.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled() || Instant::now() >= self.deadline
    }

    /// Completes once the context is cancelled or its deadline has elapsed.
    pub async fn cancelled(&self) {
        tokio::select! {
            () = self.token.cancelled() => {}
            () = tokio::time::sleep_until(self.deadline) => {}
        }
    }

    /// Returns a guard that cancels the context when dropped.
    #[must_use]
    pub fn drop_guard(&self) -> DropGuard {
        self.token.clone().drop_guard()
    }
}
