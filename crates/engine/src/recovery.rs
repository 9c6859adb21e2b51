// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic recovery of jobs stranded in-flight by a crashed worker. Runs
//! in the same process as the workers — there is no cross-process lease.

use std::sync::Arc;
use std::time::Duration;

use jobq_core::{Clock, Metrics};
use jobq_storage::Store;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::queue::Queue;

/// Ticks every `period`, reclaiming `inflight` rows older than `cutoff`.
pub struct RecoverySweep<C: Clock> {
    store: Arc<dyn Store>,
    queue: Arc<Queue<C>>,
    metrics: Metrics,
    clock: C,
    period: Duration,
    cutoff: Duration,
}

impl<C: Clock> RecoverySweep<C> {
    pub fn new(store: Arc<dyn Store>, queue: Arc<Queue<C>>, metrics: Metrics, clock: C, period: Duration, cutoff: Duration) -> Self {
        Self { store, queue, metrics, clock, period, cutoff }
    }

    /// One sweep, exposed separately from [`RecoverySweep::run`] so callers
    /// (including process startup, ahead of workers) can invoke it directly.
    pub async fn sweep_once(&self) {
        let cutoff_epoch_ms = self.clock.epoch_ms().saturating_sub(self.cutoff.as_millis() as u64);
        match self.store.recover_stuck_in_flight(cutoff_epoch_ms).await {
            Ok(recovered) => {
                if !recovered.is_empty() {
                    info!(count = recovered.len(), "recovered stuck in-flight jobs");
                }
                for job in recovered {
                    self.metrics.inc_queue_depth();
                    self.metrics.dec_inflight();
                    self.queue.push(job);
                }
            }
            Err(err) => warn!(error = %err, "recovery sweep failed, continuing on next tick"),
        }
    }

    /// Runs `sweep_once` every `period` until `cancel` fires.
    pub async fn run(&self, cancel: &CancellationToken) {
        let mut ticker = tokio::time::interval(self.period);
        loop {
            tokio::select! {
                _ = ticker.tick() => self.sweep_once().await,
                _ = cancel.cancelled() => return,
            }
        }
    }
}

#[cfg(test)]
#[path = "recovery_tests.rs"]
mod tests;
