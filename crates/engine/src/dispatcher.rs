// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The only component permitted to cross the memory/durability boundary:
//! couples queue dequeues to durable in-flight transitions, reversing both
//! on failure.

use std::sync::Arc;

use jobq_core::{Clock, Job, Metrics};
use jobq_storage::Store;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::DispatchError;
use crate::queue::Queue;

pub struct Dispatcher<C: Clock> {
    queue: Arc<Queue<C>>,
    store: Arc<dyn Store>,
    metrics: Metrics,
    clock: C,
}

impl<C: Clock> Dispatcher<C> {
    pub fn new(queue: Arc<Queue<C>>, store: Arc<dyn Store>, metrics: Metrics, clock: C) -> Self {
        Self { queue, store, metrics, clock }
    }

    /// Pop the highest-priority job and durably mark it in-flight. On store
    /// failure the job is pushed back onto the queue so the visible state is
    /// compensated; the queue tolerates a re-push of a job still logically
    /// pending in the store.
    pub async fn pop(&self, cancel: &CancellationToken) -> Result<Option<Job>, DispatchError> {
        let Some(job) = self.queue.pop(cancel).await else {
            return Ok(None);
        };
        self.metrics.dec_queue_depth();

        let picked_at = self.clock.epoch_ms();
        if let Err(err) = self.store.mark_in_flight(job.id.as_ref(), picked_at).await {
            self.queue.push(job);
            self.metrics.inc_queue_depth();
            return Err(err.into());
        }

        self.metrics.inc_inflight();
        Ok(Some(job))
    }

    /// Move `job` back to `pending` with its updated `attempts`, across two
    /// separate store transactions (`Remove` then `SavePending`). A crash
    /// between them leaves the job absent from both tables — an accepted
    /// edge case (see the recovery-sweep documentation for why duplicate
    /// execution, not job loss, is the failure mode this store model
    /// guards against).
    pub async fn requeue(&self, job: Job) -> Result<(), DispatchError> {
        self.store.remove(job.id.as_ref()).await?;
        self.store.save_pending(&job).await?;

        self.metrics.dec_inflight();
        self.queue.push(job);
        self.metrics.inc_queue_depth();
        Ok(())
    }

    /// Terminal transition: remove the job from the store. A `Remove`
    /// failure is not fatal — the job already ran to completion and the
    /// stale in-flight row self-heals via the recovery sweep.
    pub async fn complete(&self, id: &str) {
        if let Err(err) = self.store.remove(id).await {
            warn!(job_id = id, error = %err, "store remove failed after job completion");
        }
        self.metrics.dec_inflight();
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
