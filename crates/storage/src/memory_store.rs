// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A bare, non-durable [`Store`] backed by a single mutex-guarded
//! [`MaterializedState`] — no WAL, no snapshot. Used by engine tests that
//! want deterministic store behaviour without filesystem I/O.

use async_trait::async_trait;
use jobq_core::job::Job;
use parking_lot::Mutex;

use crate::error::StoreError;
use crate::event::JobEvent;
use crate::state::{InFlightRecord, MaterializedState};
use crate::store::Store;

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MaterializedState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn save_pending(&self, job: &Job) -> Result<(), StoreError> {
        self.state.lock().apply(&JobEvent::Pending { job: job.clone() });
        Ok(())
    }

    async fn load_pending(&self) -> Result<Vec<Job>, StoreError> {
        Ok(self.state.lock().pending().cloned().collect())
    }

    async fn load_in_flight(&self) -> Result<Vec<(String, InFlightRecord)>, StoreError> {
        Ok(self.state.lock().inflight().map(|(id, rec)| (id.to_string(), rec.clone())).collect())
    }

    async fn mark_in_flight(&self, id: &str, picked_at_epoch_ms: u64) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        if state.get_pending(id).is_none() {
            return Ok(());
        }
        state.apply(&JobEvent::MarkedInFlight { id: id.to_string(), picked_at: picked_at_epoch_ms });
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), StoreError> {
        self.state.lock().apply(&JobEvent::Removed { id: id.to_string() });
        Ok(())
    }

    async fn recover_stuck_in_flight(&self, cutoff_epoch_ms: u64) -> Result<Vec<Job>, StoreError> {
        let mut state = self.state.lock();
        let stuck: Vec<Job> = state.stuck_in_flight(cutoff_epoch_ms).map(|rec| rec.job.clone()).collect();
        for job in &stuck {
            state.apply(&JobEvent::Pending { job: job.clone() });
        }
        Ok(stuck)
    }
}

#[cfg(test)]
#[path = "memory_store_tests.rs"]
mod tests;
