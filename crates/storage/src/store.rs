// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The durable store contract: the two-table (`pending`/`inflight`)
//! operation set the dispatcher couples its in-memory transitions to.
//!
//! Implemented by [`crate::file_store::FileStore`] (WAL + snapshot, this
//! crate) and by `jobq-sql`'s `PostgresStore` (transactional SQL). Async so
//! both backends share one interface, even though the file-backed one never
//! actually awaits on I/O.

use async_trait::async_trait;
use jobq_core::job::Job;

use crate::error::StoreError;
use crate::state::InFlightRecord;

/// Durable two-table store: `pending` (queued, waiting for a worker) and
/// `inflight` (checked out, awaiting success/failure).
#[async_trait]
pub trait Store: Send + Sync {
    /// Persist a freshly submitted or requeued job into `pending`.
    async fn save_pending(&self, job: &Job) -> Result<(), StoreError>;

    /// All jobs currently in `pending`, for recovery-time queue rebuild.
    async fn load_pending(&self) -> Result<Vec<Job>, StoreError>;

    /// All jobs currently in `inflight`, for recovery-time accounting.
    async fn load_in_flight(&self) -> Result<Vec<(String, InFlightRecord)>, StoreError>;

    /// Atomically move a job from `pending` to `inflight`, recording when it
    /// was picked up. A no-op success if the job is not currently pending.
    async fn mark_in_flight(&self, id: &str, picked_at_epoch_ms: u64) -> Result<(), StoreError>;

    /// Remove a job from both tables — its terminal transition (completed or
    /// dead-lettered).
    async fn remove(&self, id: &str) -> Result<(), StoreError>;

    /// Move every `inflight` entry picked up before `cutoff_epoch_ms` back to
    /// `pending`, preserving `attempts`. Returns the recovered jobs.
    async fn recover_stuck_in_flight(&self, cutoff_epoch_ms: u64) -> Result<Vec<Job>, StoreError>;
}
