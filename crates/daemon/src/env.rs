// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate. No other
//! module reads `std::env::var` directly.

use std::path::PathBuf;
use std::time::Duration;

use crate::lifecycle::LifecycleError;

/// Resolve state directory: `JOBQ_STATE_DIR` > `XDG_STATE_HOME/jobq` >
/// `~/.local/state/jobq`.
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("JOBQ_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("jobq"));
    }
    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/jobq"))
}

/// Number of worker tasks to run. Default 2.
pub fn worker_count() -> usize {
    std::env::var("JOBQ_WORKER_COUNT").ok().and_then(|s| s.parse().ok()).unwrap_or(2)
}

/// Per-attempt retry delay multiplier. Default 1000ms.
pub fn retry_base_delay() -> Duration {
    std::env::var("JOBQ_RETRY_BASE_DELAY_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_millis(1000))
}

/// Recovery sweep tick interval. Default 10s.
pub fn recovery_period() -> Duration {
    std::env::var("JOBQ_RECOVERY_PERIOD_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(10))
}

/// Age past which an in-flight job is considered stuck. Default 30s.
pub fn recovery_cutoff() -> Duration {
    std::env::var("JOBQ_RECOVERY_CUTOFF_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(30))
}

/// `max_retries` substituted for submissions that leave it unspecified
/// (zero). Default 3.
pub fn default_max_retries() -> u32 {
    std::env::var("JOBQ_DEFAULT_MAX_RETRIES").ok().and_then(|s| s.parse().ok()).unwrap_or(3)
}

/// Grace period workers get to finish in-hand jobs before shutdown proceeds
/// regardless. Default 5s.
pub fn shutdown_grace() -> Duration {
    std::env::var("JOBQ_SHUTDOWN_GRACE_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(5))
}

/// Store backend DSN. `postgres://...` selects the SQL store; anything else
/// (or unset, defaulting to `<state_dir>/store`) selects the file store.
pub fn store_dsn(state_dir: &std::path::Path) -> String {
    std::env::var("JOBQ_STORE_DSN")
        .unwrap_or_else(|_| state_dir.join("store").to_string_lossy().into_owned())
}

/// Artificial per-job delay the reference `LoggingExecutor` sleeps before
/// returning. Zero by default; exists so integration tests can hold a job
/// in-flight long enough to crash the daemon deterministically.
pub fn execute_delay() -> Duration {
    std::env::var("JOBQ_EXECUTE_DELAY_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
