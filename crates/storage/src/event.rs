// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable events applied to the two-table [`crate::state::MaterializedState`].

use jobq_core::job::Job;
use serde::{Deserialize, Serialize};

/// A durable fact recorded in the write-ahead log.
///
/// Each store operation in spec terms (`save_pending`, `mark_in_flight`,
/// `remove`, `recover_stuck_in_flight`) is expressed as one or more of
/// these events, replayed in order to rebuild [`crate::state::MaterializedState`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum JobEvent {
    /// A job entered `pending`, either via fresh submission or a requeue.
    Pending { job: Job },
    /// A job moved from `pending` to `inflight`.
    MarkedInFlight { id: String, picked_at: u64 },
    /// A job was removed from both tables (completed, dead-lettered, or
    /// explicitly evicted ahead of a requeue).
    Removed { id: String },
}
