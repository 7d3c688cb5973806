//! First-to-complete race between concurrent wait probes.

use std::future::Future;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::domain::error::{BookingError, Result};
use crate::domain::scope::Scope;

type ProbeFn = Box<dyn FnOnce(Scope) -> BoxFuture<'static, Result<()>> + Send>;

/// One arm of a race: a blocking wait that resolves once its condition holds, tagged
/// with the outcome it stands for.
pub struct Probe<T> {
    label: &'static str,
    outcome: T,
    wait: ProbeFn,
}

impl<T> Probe<T> {
    pub fn new<F, Fut>(label: &'static str, outcome: T, wait: F) -> Self
    where
        F: FnOnce(Scope) -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            label,
            outcome,
            wait: Box::new(move |scope| Box::pin(wait(scope))),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }
}

/// Runs probes concurrently under a shared timeout and reports the first to finish.
#[derive(Debug, Clone, Copy)]
pub struct RaceDetector {
    timeout: Duration,
}

impl RaceDetector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Race the probes and return the index of the winner.
    ///
    /// Each probe runs in its own task under a child scope bounded by the timeout. The
    /// first probe to succeed claims the single result slot; later finishers, failed
    /// probes and reports arriving after the scope expired are dropped. Before this
    /// returns, the bounded scope is cancelled and every probe task has been stopped.
    pub async fn race_index<T>(&self, scope: &Scope, probes: Vec<Probe<T>>) -> Result<usize> {
        if let Some(err) = scope.err() {
            return Err(err);
        }
        if probes.is_empty() {
            return Err(BookingError::RaceTimeout(self.timeout));
        }

        let bounded = scope.with_timeout(self.timeout);
        // Also covers the caller dropping this future mid-race.
        let _cancel_stragglers = bounded.cancel_on_drop();

        let (tx, mut rx) = mpsc::channel::<usize>(1);
        let mut tasks = JoinSet::new();

        for (index, probe) in probes.into_iter().enumerate() {
            let Probe { label, wait, .. } = probe;
            let tx = tx.clone();
            let probe_scope = bounded.clone();

            tasks.spawn(async move {
                if let Err(err) = wait(probe_scope.clone()).await {
                    tracing::trace!(probe = label, error = %err, "Probe ended without reporting");
                    return;
                }
                if probe_scope.is_done() {
                    tracing::trace!(probe = label, "Probe finished after the race closed");
                    return;
                }
                match tx.try_send(index) {
                    Ok(()) => tracing::debug!(probe = label, index, "Probe won race"),
                    Err(_) => tracing::trace!(probe = label, "Probe lost race"),
                }
            });
        }
        drop(tx);

        let outcome = tokio::select! {
            biased;
            Some(index) = rx.recv() => Ok(index),
            err = bounded.done() => match err {
                BookingError::ContextCancelled => Err(BookingError::ContextCancelled),
                _ => Err(BookingError::RaceTimeout(self.timeout)),
            },
        };

        bounded.cancel();
        tasks.shutdown().await;

        outcome
    }

    /// Race the probes and return the winner's outcome.
    pub async fn race<T>(&self, scope: &Scope, mut probes: Vec<Probe<T>>) -> Result<T> {
        let mut outcomes = Vec::with_capacity(probes.len());
        let mut arms = Vec::with_capacity(probes.len());
        for probe in probes.drain(..) {
            outcomes.push(probe.outcome);
            arms.push(Probe {
                label: probe.label,
                outcome: (),
                wait: probe.wait,
            });
        }

        let index = self.race_index(scope, arms).await?;
        Ok(outcomes.swap_remove(index))
    }

    /// Race the probes, then run `act` on the winner's outcome and return its result.
    pub async fn race_and_act<T, R, A, Fut>(
        &self,
        scope: &Scope,
        probes: Vec<Probe<T>>,
        act: A,
    ) -> Result<R>
    where
        A: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<R>>,
    {
        let winner = self.race(scope, probes).await?;
        act(winner).await
    }
}
