// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `jobqd`: process bootstrap. Wires configuration, the durable store, the
//! in-memory queue, the dispatcher, the recovery sweep, the worker pool, and
//! the submission listener, then waits for a shutdown signal. Mirrors the
//! reference implementation's bootstrap order: metrics, store, recovery
//! loop, queue, dispatcher, listener, workers.

use std::sync::Arc;
use std::time::Duration;

use jobq_core::{Job, Metrics, WorkerId};
use jobq_daemon::listener::{ListenCtx, Listener};
use jobq_daemon::{env, lifecycle, Config};
use jobq_engine::{Executor, Worker};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Placeholder executor shipped with the reference daemon. Payload-specific
/// business logic is an external collaborator's responsibility (out of
/// scope for this crate) — a real deployment links its own `Executor`
/// against `jobq-engine` instead of running this binary directly.
struct LoggingExecutor {
    delay: Duration,
}

#[async_trait::async_trait]
impl Executor for LoggingExecutor {
    async fn execute(&self, job: &Job) -> anyhow::Result<()> {
        info!(job_id = %job.id, "executing job (reference no-op executor)");
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let config = Config::load()?;
    let result = lifecycle::startup(&config).await?;
    let mut daemon = result.daemon;

    let cancel = CancellationToken::new();

    let listen_ctx = Arc::new(ListenCtx {
        store: daemon.store.clone(),
        queue: daemon.queue.clone(),
        metrics: daemon.metrics.clone(),
        default_max_retries: daemon.config.default_max_retries,
    });
    let listener_task = tokio::spawn(Listener::new(result.listener, listen_ctx).run(cancel.clone()));

    let recovery_sweep = daemon.recovery_sweep.clone();
    let recovery_cancel = cancel.clone();
    let recovery_task = tokio::spawn(async move { recovery_sweep.run(&recovery_cancel).await });

    let executor: Arc<dyn Executor> = Arc::new(LoggingExecutor { delay: env::execute_delay() });
    let mut worker_tasks = Vec::with_capacity(daemon.config.worker_count);
    for i in 0..daemon.config.worker_count {
        let worker = Worker::new(
            WorkerId::new(format!("worker-{i}")),
            daemon.dispatcher.clone(),
            executor.clone(),
            daemon.metrics.clone(),
            daemon.config.retry_base_delay,
        );
        let worker_cancel = cancel.clone();
        worker_tasks.push(tokio::spawn(async move { worker.run(&worker_cancel).await }));
    }

    info!("jobq daemon ready");
    wait_for_shutdown_signal().await;
    info!("shutdown signal received, draining workers");

    cancel.cancel();
    daemon.queue.shutdown();

    let grace = daemon.config.shutdown_grace;
    let drain = async {
        for task in worker_tasks {
            let _ = task.await;
        }
    };
    if tokio::time::timeout(grace, drain).await.is_err() {
        warn!("shutdown grace period elapsed before all workers finished");
    }

    let _ = listener_task.await;
    let _ = recovery_task.await;

    daemon.shutdown();
    Ok(())
}

/// Waits for SIGTERM or SIGINT (Ctrl-C). Returns immediately if a handler
/// can't be installed, since there's nothing else useful to wait on.
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "failed to install SIGTERM handler");
            return;
        }
    };
    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "failed to install SIGINT handler");
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => {}
        _ = sigint.recv() => {}
    }
}
