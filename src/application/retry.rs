//! Bounded retry with fixed backoff.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

use crate::domain::error::Result;
use crate::domain::scope::Scope;

/// Attempt budget and fixed delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }
}

/// Run `operation` until it succeeds or the attempt budget is spent.
///
/// Every attempt receives a clone of `scope`. Cancellation is only checked between
/// attempts: a cancelled scope stops further attempts and yields the last attempt's
/// error, or the scope's own error when nothing ran yet. A budget of zero still runs
/// one attempt.
pub async fn execute<T, F, Fut>(
    scope: &Scope,
    policy: RetryPolicy,
    label: &str,
    mut operation: F,
) -> Result<T>
where
    F: FnMut(Scope) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    if let Some(err) = scope.err() {
        tracing::debug!(label, "Scope finished before first attempt");
        return Err(err);
    }

    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let err = match operation(scope.clone()).await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if attempt >= max_attempts {
            tracing::error!(label, attempts = attempt, error = %err, "Giving up");
            return Err(err);
        }

        if scope.is_done() {
            tracing::warn!(label, attempt, error = %err, "Scope finished, not retrying");
            return Err(err);
        }

        tracing::warn!(
            label,
            attempt,
            max_attempts,
            backoff = ?policy.backoff,
            error = %err,
            "Attempt failed, retrying"
        );

        tokio::select! {
            biased;
            _ = scope.done() => {
                tracing::warn!(label, attempt, "Scope finished during backoff");
                return Err(err);
            }
            _ = sleep(policy.backoff) => {}
        }

        attempt += 1;
    }
}
