// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker lifecycle: execute → succeed/fail/retry, cooperating with
//! cancellation. `execute` itself is delegated to an external collaborator —
//! this crate does not interpret job payloads.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use jobq_core::{Clock, Job, Metrics, WorkerId};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::dispatcher::Dispatcher;

/// A user-supplied handler that performs the actual work named by a job's
/// payload. The queue core only needs success or failure, in bounded time.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, job: &Job) -> anyhow::Result<()>;
}

/// Runs one worker's `Pop → execute → Complete | handle_failure` loop.
pub struct Worker<C: Clock> {
    id: WorkerId,
    dispatcher: Arc<Dispatcher<C>>,
    executor: Arc<dyn Executor>,
    metrics: Metrics,
    retry_base_delay: Duration,
}

impl<C: Clock + 'static> Worker<C> {
    pub fn new(
        id: WorkerId,
        dispatcher: Arc<Dispatcher<C>>,
        executor: Arc<dyn Executor>,
        metrics: Metrics,
        retry_base_delay: Duration,
    ) -> Self {
        Self { id, dispatcher, executor, metrics, retry_base_delay }
    }

    /// Runs until `cancel` fires or a store error makes further dispatch
    /// impossible. Finishes any job already in hand before returning;
    /// abandoned retry timers are the caller's accepted cost of shutdown.
    pub async fn run(&self, cancel: &CancellationToken) {
        self.metrics.inc_active_workers();
        let _guard = ActiveWorkerGuard { metrics: &self.metrics };

        loop {
            let job = match self.dispatcher.pop(cancel).await {
                Ok(Some(job)) => job,
                Ok(None) => return,
                Err(err) => {
                    warn!(worker_id = %self.id, error = %err, "dispatcher pop failed, worker exiting");
                    return;
                }
            };

            info!(worker_id = %self.id, job_id = %job.id, "executing job");
            match self.executor.execute(&job).await {
                Ok(()) => {
                    self.dispatcher.complete(job.id.as_ref()).await;
                    self.metrics.inc_jobs_completed();
                }
                Err(err) => {
                    warn!(worker_id = %self.id, job_id = %job.id, error = %err, "job execution failed");
                    self.metrics.inc_jobs_failed();
                    self.handle_failure(job, cancel);
                }
            }
        }
    }

    fn handle_failure(&self, job: Job, cancel: &CancellationToken) {
        let next = job.next_attempt();

        if next.exhausted() {
            self.metrics.inc_jobs_dead();
            let dispatcher = self.dispatcher.clone();
            let id = job.id;
            tokio::spawn(async move { dispatcher.complete(id.as_ref()).await });
            return;
        }

        self.metrics.inc_jobs_retries();
        let delay = self.retry_base_delay * next.attempts;
        let dispatcher = self.dispatcher.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    if let Err(err) = dispatcher.requeue(next).await {
                        warn!(error = %err, "requeue after retry delay failed");
                    }
                }
                _ = cancel.cancelled() => {
                    // Job stays in `inflight` in the store; recovered by the sweep.
                }
            }
        });
    }
}

struct ActiveWorkerGuard<'a> {
    metrics: &'a Metrics,
}

impl Drop for ActiveWorkerGuard<'_> {
    fn drop(&mut self) {
        self.metrics.dec_active_workers();
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
