// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only write-ahead log of [`JobEvent`]s, one JSON object per line.
//!
//! Corrupt or non-UTF-8 trailing content is treated as a torn write: the
//! valid prefix is preserved, the original file is rotated into a `.bak`
//! chain (`.bak`, `.bak.2`, `.bak.3`, oldest evicted), and the live file is
//! rewritten with only the entries that parsed cleanly.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::event::JobEvent;

/// Number of buffered, unflushed appends that forces [`Wal::needs_flush`].
pub const FLUSH_ENTRY_THRESHOLD: usize = 100;
/// Wall time since the last flush that also forces [`Wal::needs_flush`].
pub const FLUSH_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Error)]
pub enum WalError {
    #[error("wal io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("wal serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// One logged fact, tagged with its monotonically increasing sequence number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalEntry {
    pub seq: u64,
    pub event: JobEvent,
}

/// Handle to an open write-ahead log file.
pub struct Wal {
    path: PathBuf,
    file: File,
    write_seq: u64,
    processed_seq: u64,
    read_pos: u64,
    unflushed: usize,
    last_flush: Instant,
}

impl Wal {
    /// Open (creating if absent) the log at `path`. `processed_seq` is the
    /// sequence number already incorporated into a snapshot — entries up to
    /// and including it are skipped by [`Wal::next_unprocessed`].
    pub fn open(path: impl AsRef<Path>, processed_seq: u64) -> Result<Self, WalError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            File::create(&path)?;
        }

        let raw = fs::read(&path)?;
        let (valid, corrupted) = parse_valid_prefix(&raw);

        if corrupted {
            warn!(path = %path.display(), "wal contains corrupt trailing data, rotating backup");
            rotate_backups(&path)?;
            fs::write(path.with_extension("bak"), &raw)?;
            let mut rewritten = File::create(&path)?;
            for (_, line, _) in &valid {
                writeln!(rewritten, "{line}")?;
            }
            rewritten.sync_all()?;
        }

        let write_seq = valid.last().map(|(seq, ..)| *seq).unwrap_or(0);
        let read_pos = valid
            .iter()
            .filter(|(seq, ..)| *seq <= processed_seq)
            .next_back()
            .map(|(_, _, end)| *end)
            .unwrap_or(0);

        let file = OpenOptions::new().append(true).open(&path)?;

        Ok(Self { path, file, write_seq, processed_seq, read_pos, unflushed: 0, last_flush: Instant::now() })
    }

    pub fn write_seq(&self) -> u64 {
        self.write_seq
    }

    pub fn processed_seq(&self) -> u64 {
        self.processed_seq
    }

    /// Append an event, returning its assigned sequence number. Not durable
    /// until [`Wal::flush`].
    pub fn append(&mut self, event: &JobEvent) -> Result<u64, WalError> {
        self.write_seq += 1;
        let entry = WalEntry { seq: self.write_seq, event: event.clone() };
        writeln!(self.file, "{}", serde_json::to_string(&entry)?)?;
        self.unflushed += 1;
        Ok(self.write_seq)
    }

    pub fn flush(&mut self) -> Result<(), WalError> {
        self.file.flush()?;
        self.file.sync_all()?;
        self.unflushed = 0;
        self.last_flush = Instant::now();
        Ok(())
    }

    /// Whether enough unflushed data has accumulated (by count or by time)
    /// to warrant a [`Wal::flush`].
    pub fn needs_flush(&self) -> bool {
        if self.unflushed == 0 {
            return false;
        }
        self.unflushed >= FLUSH_ENTRY_THRESHOLD || self.last_flush.elapsed() >= FLUSH_INTERVAL
    }

    pub fn mark_processed(&mut self, seq: u64) {
        if seq > self.processed_seq {
            self.processed_seq = seq;
        }
    }

    /// Read the next entry past the internal read cursor, if a complete and
    /// well-formed line is available. A corrupt or incomplete line is
    /// skipped (cursor still advances past it) and yields `None` for this
    /// call; the caller's engine loop treats `None` the same as "nothing
    /// new yet" and retries later.
    pub fn next_unprocessed(&mut self) -> Result<Option<WalEntry>, WalError> {
        let mut f = File::open(&self.path)?;
        f.seek(SeekFrom::Start(self.read_pos))?;
        let mut reader = BufReader::new(f);
        let mut buf = Vec::new();
        read_until_newline(&mut reader, &mut buf)?;
        if buf.is_empty() {
            return Ok(None);
        }
        if !buf.ends_with(b"\n") {
            // Partial line — the writer hasn't finished this append yet.
            return Ok(None);
        }
        self.read_pos += buf.len() as u64;
        let content = &buf[..buf.len() - 1];
        Ok(std::str::from_utf8(content).ok().and_then(|s| serde_json::from_str::<WalEntry>(s).ok()))
    }

    /// Every entry with `seq > cutoff`, scanned from the start of the file.
    /// Stops (without erroring) at the first corrupt or non-UTF-8 line.
    pub fn entries_after(&self, cutoff: u64) -> Result<Vec<WalEntry>, WalError> {
        let raw = fs::read(&self.path)?;
        let mut out = Vec::new();
        for line in split_lines(&raw) {
            let Ok(text) = std::str::from_utf8(line) else { break };
            if text.is_empty() {
                continue;
            }
            let Ok(entry) = serde_json::from_str::<WalEntry>(text) else { break };
            if entry.seq > cutoff {
                out.push(entry);
            }
        }
        Ok(out)
    }

    /// Rewrite the log keeping only entries with `seq >= cutoff`, used after
    /// a snapshot makes earlier entries redundant.
    pub fn truncate_before(&mut self, cutoff: u64) -> Result<(), WalError> {
        let keep: Vec<_> = self.entries_after(0)?.into_iter().filter(|e| e.seq >= cutoff).collect();
        let mut f = File::create(&self.path)?;
        for entry in &keep {
            writeln!(f, "{}", serde_json::to_string(entry)?)?;
        }
        f.sync_all()?;
        self.file = OpenOptions::new().append(true).open(&self.path)?;
        Ok(())
    }
}

/// Split a byte buffer on `\n`, dropping a trailing partial (no-newline) line.
fn split_lines(raw: &[u8]) -> impl Iterator<Item = &[u8]> {
    let mut idx = 0;
    std::iter::from_fn(move || {
        if idx >= raw.len() {
            return None;
        }
        let pos = raw[idx..].iter().position(|&b| b == b'\n')?;
        let line = &raw[idx..idx + pos];
        idx += pos + 1;
        Some(line)
    })
}

/// Parse the valid leading run of WAL lines. Returns each `(seq, raw line
/// text, cumulative byte offset after the line)` and whether parsing
/// stopped early because of corruption.
#[allow(clippy::type_complexity)]
fn parse_valid_prefix(raw: &[u8]) -> (Vec<(u64, String, u64)>, bool) {
    let mut valid = Vec::new();
    let mut offset: u64 = 0;
    let mut idx = 0usize;
    let mut corrupted = false;
    while idx < raw.len() {
        let Some(pos) = raw[idx..].iter().position(|&b| b == b'\n') else {
            corrupted = true;
            break;
        };
        let line = &raw[idx..idx + pos];
        let consumed = (pos + 1) as u64;
        let Ok(text) = std::str::from_utf8(line) else {
            corrupted = true;
            break;
        };
        if text.is_empty() {
            idx += pos + 1;
            offset += consumed;
            continue;
        }
        match serde_json::from_str::<WalEntry>(text) {
            Ok(entry) => {
                offset += consumed;
                valid.push((entry.seq, text.to_string(), offset));
                idx += pos + 1;
            }
            Err(_) => {
                corrupted = true;
                break;
            }
        }
    }
    (valid, corrupted)
}

fn rotate_backups(path: &Path) -> std::io::Result<()> {
    let bak1 = path.with_extension("bak");
    let bak2 = path.with_extension("bak.2");
    let bak3 = path.with_extension("bak.3");

    if bak3.exists() {
        fs::remove_file(&bak3)?;
    }
    if bak2.exists() {
        fs::rename(&bak2, &bak3)?;
    }
    if bak1.exists() {
        fs::rename(&bak1, &bak2)?;
    }
    Ok(())
}

fn read_until_newline(reader: &mut impl Read, buf: &mut Vec<u8>) -> std::io::Result<()> {
    let mut byte = [0u8; 1];
    loop {
        let n = reader.read(&mut byte)?;
        if n == 0 {
            return Ok(());
        }
        buf.push(byte[0]);
        if byte[0] == b'\n' {
            return Ok(());
        }
    }
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
