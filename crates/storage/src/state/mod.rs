// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory replay target for the write-ahead log: the two logical tables
//! (`pending`, `inflight`) described by the store's operation contract.

use std::collections::HashMap;

use jobq_core::job::Job;

use crate::event::JobEvent;

/// A job currently checked out by a worker, with the wall-clock instant it
/// was picked up.
#[derive(Debug, Clone, PartialEq)]
pub struct InFlightRecord {
    pub job: Job,
    pub picked_at: u64,
}

/// The two-table state rebuilt by replaying [`JobEvent`]s in sequence order.
///
/// `apply` is idempotent per event: replaying the same event twice (as can
/// happen after a crash mid-flush) leaves the tables in the same state as
/// applying it once.
#[derive(Debug, Default, Clone)]
pub struct MaterializedState {
    pending: HashMap<String, Job>,
    inflight: HashMap<String, InFlightRecord>,
}

impl MaterializedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one durable event into the tables.
    pub fn apply(&mut self, event: &JobEvent) {
        match event {
            JobEvent::Pending { job } => {
                self.inflight.remove(job.id.as_ref());
                self.pending.insert(job.id.to_string(), job.clone());
            }
            JobEvent::MarkedInFlight { id, picked_at } => {
                if let Some(job) = self.pending.remove(id.as_str()) {
                    self.inflight.insert(id.clone(), InFlightRecord { job, picked_at: *picked_at });
                }
                // A `MarkedInFlight` with no matching pending entry means the
                // job was already moved (replay of an already-applied event,
                // or the entry was concurrently removed) — skip silently.
            }
            JobEvent::Removed { id } => {
                self.pending.remove(id.as_str());
                self.inflight.remove(id.as_str());
            }
        }
    }

    pub fn pending(&self) -> impl Iterator<Item = &Job> {
        self.pending.values()
    }

    pub fn get_pending(&self, id: &str) -> Option<&Job> {
        self.pending.get(id)
    }

    pub fn inflight(&self) -> impl Iterator<Item = (&str, &InFlightRecord)> {
        self.inflight.iter().map(|(id, rec)| (id.as_str(), rec))
    }

    pub fn get_inflight(&self, id: &str) -> Option<&InFlightRecord> {
        self.inflight.get(id)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn inflight_len(&self) -> usize {
        self.inflight.len()
    }

    /// In-flight records whose `picked_at` is older than `cutoff_epoch_ms` —
    /// candidates for the recovery sweep.
    pub fn stuck_in_flight(&self, cutoff_epoch_ms: u64) -> impl Iterator<Item = &InFlightRecord> {
        self.inflight.values().filter(move |rec| rec.picked_at < cutoff_epoch_ms)
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
