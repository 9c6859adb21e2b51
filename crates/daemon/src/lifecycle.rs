// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, shutdown, crash recovery.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use fs2::FileExt;
use jobq_core::{Clock, Metrics, SystemClock};
use jobq_engine::{Dispatcher, Queue, RecoverySweep};
use jobq_sql::PostgresStore;
use jobq_storage::{FileStore, Store, StoreError};
use thiserror::Error;
use tokio::net::UnixListener;
use tracing::{info, warn};

use crate::env;

/// Daemon configuration, resolved once at startup from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub state_dir: PathBuf,
    pub socket_path: PathBuf,
    pub lock_path: PathBuf,
    pub store_dsn: String,
    pub worker_count: usize,
    pub retry_base_delay: std::time::Duration,
    pub recovery_period: std::time::Duration,
    pub recovery_cutoff: std::time::Duration,
    pub default_max_retries: u32,
    pub shutdown_grace: std::time::Duration,
}

impl Config {
    /// Load configuration for the single user-level daemon instance.
    pub fn load() -> Result<Self, LifecycleError> {
        let state_dir = env::state_dir()?;

        Ok(Self {
            socket_path: state_dir.join("daemon.sock"),
            lock_path: state_dir.join("daemon.pid"),
            store_dsn: env::store_dsn(&state_dir),
            worker_count: env::worker_count(),
            retry_base_delay: env::retry_base_delay(),
            recovery_period: env::recovery_period(),
            recovery_cutoff: env::recovery_cutoff(),
            default_max_retries: env::default_max_retries(),
            shutdown_grace: env::shutdown_grace(),
            state_dir,
        })
    }
}

/// Daemon state during operation, held by `main` for the life of the process.
pub struct DaemonState {
    pub config: Config,
    // Held to maintain the exclusive file lock; released on drop.
    #[allow(dead_code)]
    lock_file: File,
    pub store: Arc<dyn Store>,
    pub queue: Arc<Queue<SystemClock>>,
    pub dispatcher: Arc<Dispatcher<SystemClock>>,
    pub recovery_sweep: Arc<RecoverySweep<SystemClock>>,
    pub metrics: Metrics,
}

/// Result of a successful startup: daemon state plus the bound listener,
/// which the caller spawns as its own task.
pub struct StartupResult {
    pub daemon: DaemonState,
    pub listener: UnixListener,
}

impl DaemonState {
    /// Remove the socket, lock, and PID files. The file lock itself releases
    /// when `lock_file` drops at the end of `main`.
    pub fn shutdown(&self) {
        info!("shutting down daemon");

        if self.config.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.socket_path) {
                warn!(error = %e, "failed to remove socket file");
            }
        }
        if self.config.lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.lock_path) {
                warn!(error = %e, "failed to remove lock file");
            }
        }

        info!("daemon shutdown complete");
    }
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("could not determine state directory")]
    NoStateDir,
    #[error("failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),
    #[error("failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start the daemon: acquire the lock, open the store, replay/recover state
/// onto the queue, and bind the listening socket. Cleans up any
/// partially-created files on failure, except when the lock itself could not
/// be acquired (those files belong to the already-running daemon).
pub async fn startup(config: &Config) -> Result<StartupResult, LifecycleError> {
    match startup_inner(config).await {
        Ok(result) => Ok(result),
        Err(e) => {
            if !matches!(e, LifecycleError::LockFailed(_)) {
                cleanup_on_failure(config);
            }
            Err(e)
        }
    }
}

async fn startup_inner(config: &Config) -> Result<StartupResult, LifecycleError> {
    std::fs::create_dir_all(&config.state_dir)?;

    // Acquire the lock before touching anything else — prevents two daemons
    // racing to bind the same socket.
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)?;
    lock_file.try_lock_exclusive().map_err(LifecycleError::LockFailed)?;

    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    let store = open_store(&config.store_dsn).await?;
    let metrics = Metrics::new();
    let clock = SystemClock;
    let queue = Arc::new(Queue::new(clock.clone()));

    for job in store.load_pending().await? {
        queue.push(job);
        metrics.inc_queue_depth();
    }

    // Every job still `inflight` at startup belongs to a previous process —
    // there is no worker alive to finish it, so it is unconditionally
    // reclaimed here rather than waiting for the periodic sweep's cutoff.
    let now = clock.epoch_ms();
    let recovered = store.recover_stuck_in_flight(now).await?;
    if !recovered.is_empty() {
        info!(count = recovered.len(), "recovered in-flight jobs from previous run");
    }
    for job in recovered {
        queue.push(job);
        metrics.inc_queue_depth();
    }

    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path)
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;

    let dispatcher = Arc::new(Dispatcher::new(queue.clone(), store.clone(), metrics.clone(), clock.clone()));
    let recovery_sweep = Arc::new(RecoverySweep::new(
        store.clone(),
        queue.clone(),
        metrics.clone(),
        clock,
        config.recovery_period,
        config.recovery_cutoff,
    ));

    info!(worker_count = config.worker_count, "daemon started");

    Ok(StartupResult {
        daemon: DaemonState { config: config.clone(), lock_file, store, queue, dispatcher, recovery_sweep, metrics },
        listener,
    })
}

async fn open_store(dsn: &str) -> Result<Arc<dyn Store>, LifecycleError> {
    if dsn.starts_with("postgres://") || dsn.starts_with("postgresql://") {
        let store = PostgresStore::connect(dsn).await?;
        Ok(Arc::new(store))
    } else {
        let store = FileStore::open(dsn)?;
        Ok(Arc::new(store))
    }
}

fn cleanup_on_failure(config: &Config) {
    if config.socket_path.exists() {
        let _ = std::fs::remove_file(&config.socket_path);
    }
    if config.lock_path.exists() {
        let _ = std::fs::remove_file(&config.lock_path);
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
