// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic checkpoint of [`MaterializedState`], letting the write-ahead log
//! be truncated instead of growing without bound.
//!
//! This is a deliberately narrow form of the teacher's full migration chain:
//! one version stamp, one mismatch error, no upgrade path between versions.
//! A durable job queue has no on-disk format history to migrate yet.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::JobEvent;
use crate::state::MaterializedState;

/// Bumped whenever the on-disk snapshot layout changes incompatibly.
pub const CURRENT_SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("snapshot version mismatch: file is v{found}, this build expects v{CURRENT_SNAPSHOT_VERSION}")]
    VersionMismatch { found: u32 },
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
    version: u32,
    processed_seq: u64,
    events: Vec<JobEvent>,
}

/// A point-in-time checkpoint: the WAL sequence number it was taken at, plus
/// enough events to rebuild [`MaterializedState`] by replay.
#[derive(Debug)]
pub struct Snapshot {
    pub processed_seq: u64,
    pub events: Vec<JobEvent>,
}

impl Snapshot {
    pub fn rebuild(&self) -> MaterializedState {
        let mut state = MaterializedState::new();
        for event in &self.events {
            state.apply(event);
        }
        state
    }
}

/// Reads and atomically writes snapshot files. Writes go to a `.tmp` sibling
/// and are renamed into place, so a crash mid-write leaves the prior
/// snapshot (or none) intact rather than a half-written file.
pub struct Checkpointer {
    path: PathBuf,
}

impl Checkpointer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<Option<Snapshot>, SnapshotError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read(&self.path)?;
        let file: SnapshotFile = serde_json::from_slice(&raw)?;
        if file.version != CURRENT_SNAPSHOT_VERSION {
            return Err(SnapshotError::VersionMismatch { found: file.version });
        }
        Ok(Some(Snapshot { processed_seq: file.processed_seq, events: file.events }))
    }

    /// Save `state` as of `processed_seq`, by re-expressing it as the minimal
    /// event set that reconstructs it: one `Pending` per pending job, one
    /// `MarkedInFlight` per in-flight job preceded by the `Pending` that
    /// seeds its fields.
    pub fn save(&self, state: &MaterializedState, processed_seq: u64) -> Result<(), SnapshotError> {
        let mut events = Vec::with_capacity(state.pending_len() + state.inflight_len() * 2);
        for job in state.pending() {
            events.push(JobEvent::Pending { job: job.clone() });
        }
        for (id, rec) in state.inflight() {
            events.push(JobEvent::Pending { job: rec.job.clone() });
            events.push(JobEvent::MarkedInFlight { id: id.to_string(), picked_at: rec.picked_at });
        }

        let file = SnapshotFile { version: CURRENT_SNAPSHOT_VERSION, processed_seq, events };
        let tmp_path = tmp_path(&self.path);
        let mut tmp = File::create(&tmp_path)?;
        tmp.write_all(&serde_json::to_vec(&file)?)?;
        tmp.sync_all()?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().and_then(|n| n.to_str()).unwrap_or("snapshot").to_string();
    name.push_str(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
