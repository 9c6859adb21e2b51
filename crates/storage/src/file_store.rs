// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`Store`] backed by a write-ahead log plus periodic snapshots — the
//! default durable backend, used when no SQL DSN is configured.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use jobq_core::job::Job;
use parking_lot::Mutex;

use crate::error::StoreError;
use crate::event::JobEvent;
use crate::snapshot::Checkpointer;
use crate::state::{InFlightRecord, MaterializedState};
use crate::store::Store;
use crate::wal::Wal;

struct Inner {
    wal: Wal,
    state: MaterializedState,
    checkpointer: Checkpointer,
}

/// Durable store rooted at a directory holding `jobq.wal` and `snapshot.json`.
///
/// On open, replays the last snapshot (if any) followed by every WAL entry
/// past the snapshot's sequence number, rebuilding [`MaterializedState`]
/// exactly as it stood before the process last stopped.
pub struct FileStore {
    inner: Mutex<Inner>,
}

impl FileStore {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let checkpointer = Checkpointer::new(dir.join("snapshot.json"));

        let (mut state, processed_seq) = match checkpointer.load()? {
            Some(snapshot) => {
                let processed_seq = snapshot.processed_seq;
                (snapshot.rebuild(), processed_seq)
            }
            None => (MaterializedState::new(), 0),
        };

        let wal = Wal::open(wal_path(dir), processed_seq)?;
        for entry in wal.entries_after(processed_seq)? {
            state.apply(&entry.event);
        }

        Ok(Self { inner: Mutex::new(Inner { wal, state, checkpointer }) })
    }

    /// Checkpoint the current state and truncate the WAL to entries after it.
    /// Called periodically by the daemon's lifecycle loop, not by callers of
    /// [`Store`] directly.
    pub fn checkpoint(&self) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let seq = inner.wal.write_seq();
        inner.checkpointer.save(&inner.state, seq)?;
        inner.wal.truncate_before(seq + 1)?;
        Ok(())
    }
}

fn wal_path(dir: &Path) -> PathBuf {
    dir.join("jobq.wal")
}

#[async_trait]
impl Store for FileStore {
    async fn save_pending(&self, job: &Job) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let event = JobEvent::Pending { job: job.clone() };
        inner.wal.append(&event)?;
        inner.wal.flush()?;
        inner.state.apply(&event);
        Ok(())
    }

    async fn load_pending(&self) -> Result<Vec<Job>, StoreError> {
        Ok(self.inner.lock().state.pending().cloned().collect())
    }

    async fn load_in_flight(&self) -> Result<Vec<(String, InFlightRecord)>, StoreError> {
        Ok(self.inner.lock().state.inflight().map(|(id, rec)| (id.to_string(), rec.clone())).collect())
    }

    async fn mark_in_flight(&self, id: &str, picked_at_epoch_ms: u64) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        if inner.state.get_pending(id).is_none() {
            return Ok(());
        }
        let event = JobEvent::MarkedInFlight { id: id.to_string(), picked_at: picked_at_epoch_ms };
        inner.wal.append(&event)?;
        inner.wal.flush()?;
        inner.state.apply(&event);
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let event = JobEvent::Removed { id: id.to_string() };
        inner.wal.append(&event)?;
        inner.wal.flush()?;
        inner.state.apply(&event);
        Ok(())
    }

    async fn recover_stuck_in_flight(&self, cutoff_epoch_ms: u64) -> Result<Vec<Job>, StoreError> {
        let mut inner = self.inner.lock();
        let stuck: Vec<Job> = inner.state.stuck_in_flight(cutoff_epoch_ms).map(|rec| rec.job.clone()).collect();
        for job in &stuck {
            let event = JobEvent::Pending { job: job.clone() };
            inner.wal.append(&event)?;
            inner.state.apply(&event);
        }
        if !stuck.is_empty() {
            inner.wal.flush()?;
        }
        Ok(stuck)
    }
}

#[cfg(test)]
#[path = "file_store_tests.rs"]
mod tests;
