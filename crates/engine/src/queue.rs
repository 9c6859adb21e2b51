// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory priority queue with age-based aging, keyed by
//! `effective_priority = priority + floor(age_seconds)`.

use std::sync::atomic::{AtomicBool, Ordering};

use jobq_core::{Clock, Job};
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// Priority queue guarded by a single mutex, with a [`Notify`] standing in
/// for the condition variable a synchronous implementation would use.
///
/// Effective priority is time-dependent, so entries can't stay in sorted
/// order between pushes — `pop` re-evaluates every entry's priority at
/// extraction time rather than maintaining a stale heap order. This is
/// linear in queue size, acceptable because the in-memory queue is expected
/// to be small relative to the durable backlog.
pub struct Queue<C: Clock> {
    items: Mutex<Vec<Job>>,
    notify: Notify,
    shutdown: AtomicBool,
    clock: C,
}

impl<C: Clock> Queue<C> {
    pub fn new(clock: C) -> Self {
        Self { items: Mutex::new(Vec::new()), notify: Notify::new(), shutdown: AtomicBool::new(false), clock }
    }

    /// Insert a job and wake one waiter.
    pub fn push(&self, job: Job) {
        self.items.lock().push(job);
        self.notify.notify_one();
    }

    /// Block until a job is available, the queue is shut down, or `cancel`
    /// fires. Returns `None` on shutdown/cancellation, never on a spurious
    /// wakeup.
    pub async fn pop(&self, cancel: &CancellationToken) -> Option<Job> {
        loop {
            if self.shutdown.load(Ordering::Acquire) || cancel.is_cancelled() {
                return None;
            }

            if let Some(job) = self.try_pop_highest() {
                return Some(job);
            }

            tokio::select! {
                _ = self.notify.notified() => {}
                _ = cancel.cancelled() => return None,
            }
        }
    }

    fn try_pop_highest(&self) -> Option<Job> {
        let mut items = self.items.lock();
        if items.is_empty() {
            return None;
        }
        let now = self.clock.epoch_ms();
        let mut best_idx = 0;
        let mut best_priority = items[0].effective_priority(now);
        for (idx, job) in items.iter().enumerate().skip(1) {
            let priority = job.effective_priority(now);
            if priority > best_priority {
                best_priority = priority;
                best_idx = idx;
            }
        }
        Some(items.remove(best_idx))
    }

    /// Wake every waiter; subsequent `pop` calls return `None` immediately.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
