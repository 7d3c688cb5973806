//! Cancellation and deadline boundary handed down to every browser operation.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::domain::error::{BookingError, Result};

/// A cancellation scope with an optional deadline.
///
/// Child scopes share the parent's cancellation: cancelling an ancestor cancels every
/// descendant, while cancelling or expiring a child leaves the parent untouched.
#[derive(Debug, Clone)]
pub struct Scope {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Scope {
    /// Root scope with no deadline.
    pub fn root() -> Self {
        Self::from_token(CancellationToken::new())
    }

    pub fn from_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Child scope inheriting the parent's deadline.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Child scope that expires after `timeout`, or at the parent's deadline if sooner.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(parent) if parent < candidate => parent,
            _ => candidate,
        };
        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Cancels this scope (and its descendants) when the guard is dropped.
    pub fn cancel_on_drop(&self) -> DropGuard {
        self.token.clone().drop_guard()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The error this scope currently reports, if it is finished.
    pub fn err(&self) -> Option<BookingError> {
        if self.token.is_cancelled() {
            return Some(BookingError::ContextCancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(BookingError::DeadlineExceeded),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Resolves once the scope is cancelled or its deadline passes.
    pub async fn done(&self) -> BookingError {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    biased;
                    _ = self.token.cancelled() => BookingError::ContextCancelled,
                    _ = sleep_until(deadline) => BookingError::DeadlineExceeded,
                }
            }
            None => {
                self.token.cancelled().await;
                BookingError::ContextCancelled
            }
        }
    }

    /// Drive `fut` until it completes or the scope finishes, whichever comes first.
    pub async fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if let Some(err) = self.err() {
            return Err(err);
        }
        tokio::select! {
            biased;
            err = self.done() => Err(err),
            result = fut => result,
        }
    }

    /// Sleep for `duration` unless the scope finishes first.
    pub async fn sleep(&self, duration: Duration) -> Result<()> {
        self.run(async {
            sleep(duration).await;
            Ok(())
        })
        .await
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::root()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_timeout_scope_expires() {
        let root = Scope::root();
        let bounded = root.with_timeout(Duration::from_secs(1));
        assert!(bounded.err().is_none());

        let err = bounded.done().await;
        assert!(matches!(err, BookingError::DeadlineExceeded));
        assert!(root.err().is_none(), "parent must outlive an expired child");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_propagates_to_descendants() {
        let root = Scope::root();
        let child = root.child();
        let grandchild = child.with_timeout(Duration::from_secs(60));

        root.cancel();
        assert!(matches!(child.err(), Some(BookingError::ContextCancelled)));
        assert!(matches!(grandchild.done().await, BookingError::ContextCancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_child_deadline_never_exceeds_parent() {
        let parent = Scope::root().with_timeout(Duration::from_secs(2));
        let child = parent.with_timeout(Duration::from_secs(10));
        assert_eq!(child.deadline(), parent.deadline());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_at_deadline() {
        let scope = Scope::root().with_timeout(Duration::from_millis(100));
        let result = scope
            .run(async {
                sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;
        assert!(matches!(result, Err(BookingError::DeadlineExceeded)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_guard_cancels() {
        let scope = Scope::root().child();
        {
            let _guard = scope.cancel_on_drop();
        }
        assert!(matches!(scope.err(), Some(BookingError::ContextCancelled)));
    }
}
