// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The metrics sink: counters and gauges shared by every other component.
//!
//! A pure interface — no exposition format is mandated by this crate.
//! `render_text` gives a line-oriented rendering for callers that want one,
//! matching the "simple line-oriented format" allowance, not a contract.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct Counters {
    jobs_submitted: AtomicU64,
    jobs_completed: AtomicU64,
    jobs_failed: AtomicU64,
    jobs_retries: AtomicU64,
    jobs_dead: AtomicU64,
}

#[derive(Debug, Default)]
struct Gauges {
    queue_depth: AtomicI64,
    inflight: AtomicI64,
    active_workers: AtomicI64,
}

/// Shared counter/gauge sink. Cheap to clone; all mutation is through
/// atomics so concurrent callers never contend on a lock.
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    counters: Arc<Counters>,
    gauges: Arc<Gauges>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_jobs_submitted(&self) {
        self.counters.jobs_submitted.fetch_add(1, Ordering::Relaxed);
    }
    pub fn inc_jobs_completed(&self) {
        self.counters.jobs_completed.fetch_add(1, Ordering::Relaxed);
    }
    pub fn inc_jobs_failed(&self) {
        self.counters.jobs_failed.fetch_add(1, Ordering::Relaxed);
    }
    pub fn inc_jobs_retries(&self) {
        self.counters.jobs_retries.fetch_add(1, Ordering::Relaxed);
    }
    pub fn inc_jobs_dead(&self) {
        self.counters.jobs_dead.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_queue_depth(&self) {
        self.gauges.queue_depth.fetch_add(1, Ordering::Relaxed);
    }
    pub fn dec_queue_depth(&self) {
        self.gauges.queue_depth.fetch_sub(1, Ordering::Relaxed);
    }
    pub fn inc_inflight(&self) {
        self.gauges.inflight.fetch_add(1, Ordering::Relaxed);
    }
    pub fn dec_inflight(&self) {
        self.gauges.inflight.fetch_sub(1, Ordering::Relaxed);
    }
    pub fn inc_active_workers(&self) {
        self.gauges.active_workers.fetch_add(1, Ordering::Relaxed);
    }
    pub fn dec_active_workers(&self) {
        self.gauges.active_workers.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            jobs_submitted: self.counters.jobs_submitted.load(Ordering::Relaxed),
            jobs_completed: self.counters.jobs_completed.load(Ordering::Relaxed),
            jobs_failed: self.counters.jobs_failed.load(Ordering::Relaxed),
            jobs_retries: self.counters.jobs_retries.load(Ordering::Relaxed),
            jobs_dead: self.counters.jobs_dead.load(Ordering::Relaxed),
            queue_depth: self.gauges.queue_depth.load(Ordering::Relaxed),
            inflight: self.gauges.inflight.load(Ordering::Relaxed),
            active_workers: self.gauges.active_workers.load(Ordering::Relaxed),
        }
    }

    /// Render the current values as `name value` lines, one metric per line.
    pub fn render_text(&self) -> String {
        self.snapshot().render_text()
    }
}

/// A point-in-time read of every counter and gauge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MetricsSnapshot {
    pub jobs_submitted: u64,
    pub jobs_completed: u64,
    pub jobs_failed: u64,
    pub jobs_retries: u64,
    pub jobs_dead: u64,
    pub queue_depth: i64,
    pub inflight: i64,
    pub active_workers: i64,
}

impl MetricsSnapshot {
    pub fn render_text(&self) -> String {
        format!(
            "jobs_submitted_total {}\njobs_completed_total {}\njobs_failed_total {}\njobs_retries_total {}\njobs_dead_total {}\nqueue_depth {}\ninflight {}\nactive_workers {}\n",
            self.jobs_submitted,
            self.jobs_completed,
            self.jobs_failed,
            self.jobs_retries,
            self.jobs_dead,
            self.queue_depth,
            self.inflight,
            self.active_workers,
        )
    }
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
