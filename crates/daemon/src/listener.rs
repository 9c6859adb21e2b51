// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for the submission/control Unix socket. Runs in a spawned
//! task, accepting connections and handling each on its own task so a slow
//! client can't block others.

use std::sync::Arc;

use jobq_core::{validate_submission, Clock, Job, JobId, Metrics, SystemClock};
use jobq_engine::Queue;
use jobq_storage::Store;
use jobq_wire::{read_request, write_response, ProtocolError, Request, Response};
use thiserror::Error;
use tokio::net::{UnixListener, UnixStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

/// Shared context every connection handler reads from.
pub struct ListenCtx {
    pub store: Arc<dyn Store>,
    pub queue: Arc<Queue<SystemClock>>,
    pub metrics: Metrics,
    pub default_max_retries: u32,
}

/// Accepts connections on the daemon's Unix socket, dispatching each to its
/// own task.
pub struct Listener {
    listener: UnixListener,
    ctx: Arc<ListenCtx>,
}

#[derive(Debug, Error)]
enum ConnectionError {
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl Listener {
    pub fn new(listener: UnixListener, ctx: Arc<ListenCtx>) -> Self {
        Self { listener, ctx }
    }

    /// Accept connections until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) {
        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, _)) => {
                            let ctx = Arc::clone(&self.ctx);
                            tokio::spawn(async move {
                                if let Err(e) = handle_connection(stream, &ctx).await {
                                    debug!(error = %e, "connection closed with error");
                                }
                            });
                        }
                        Err(e) => error!(error = %e, "accept failed"),
                    }
                }
                _ = cancel.cancelled() => return,
            }
        }
    }
}

async fn handle_connection(mut stream: UnixStream, ctx: &ListenCtx) -> Result<(), ConnectionError> {
    let request = read_request(&mut stream).await?;
    debug!(request = ?request, "received request");

    let response = handle_request(request, ctx).await;

    write_response(&mut stream, &response).await?;
    Ok(())
}

async fn handle_request(request: Request, ctx: &ListenCtx) -> Response {
    match request {
        Request::Submit { priority, max_retries, payload } => handle_submit(ctx, priority, max_retries, payload).await,
        Request::Status => Response::Status { metrics: ctx.metrics.snapshot() },
        Request::Metrics => Response::Metrics { text: ctx.metrics.render_text() },
    }
}

async fn handle_submit(ctx: &ListenCtx, priority: i64, max_retries: i64, payload: jobq_core::Payload) -> Response {
    let (priority, max_retries) = match validate_submission(priority, max_retries, ctx.default_max_retries) {
        Ok(fields) => fields,
        Err(e) => return Response::Error { message: e.to_string() },
    };

    let job = Job::new(JobId::new(), SystemClock.epoch_ms(), priority, payload, max_retries);

    if let Err(e) = ctx.store.save_pending(&job).await {
        return Response::Error { message: e.to_string() };
    }

    let id = job.id.to_string();
    ctx.queue.push(job);
    ctx.metrics.inc_jobs_submitted();
    ctx.metrics.inc_queue_depth();

    Response::Submitted { id }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
