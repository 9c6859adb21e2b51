// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! jobq-storage: the durable two-table store. A write-ahead log of
//! [`event::JobEvent`]s, periodic snapshots, and a [`store::Store`] trait
//! with a file-backed implementation. `jobq-sql` provides the transactional
//! SQL alternative against the same trait.

pub mod error;
pub mod event;
pub mod file_store;
pub mod memory_store;
pub mod snapshot;
pub mod state;
pub mod store;
pub mod wal;

pub use error::StoreError;
pub use event::JobEvent;
pub use file_store::FileStore;
pub use memory_store::MemoryStore;
pub use snapshot::{Checkpointer, Snapshot, CURRENT_SNAPSHOT_VERSION};
pub use state::{InFlightRecord, MaterializedState};
pub use store::Store;
pub use wal::{Wal, WalEntry};
