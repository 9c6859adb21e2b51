// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A thin client for the daemon's submission/control Unix socket. Each call
//! opens its own connection — commands are one-shot, not a persistent
//! session.

use std::path::PathBuf;

use jobq_core::{MetricsSnapshot, Payload};
use jobq_wire::{Request, Response};
use thiserror::Error;
use tokio::net::UnixStream;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("daemon is not running (no socket at {0})")]
    NotRunning(PathBuf),
    #[error("cannot determine daemon socket path: {0}")]
    NoSocket(String),
    #[error("failed to connect to daemon at {path}: {source}")]
    Connect { path: PathBuf, source: std::io::Error },
    #[error(transparent)]
    Protocol(#[from] jobq_wire::ProtocolError),
    #[error("daemon returned an error: {0}")]
    Daemon(String),
    #[error("unexpected response from daemon: {0:?}")]
    UnexpectedResponse(Response),
}

pub struct DaemonClient {
    socket_path: PathBuf,
}

impl DaemonClient {
    /// Resolve the daemon's socket path and confirm it exists. Does not
    /// open a connection yet — each request does that independently.
    pub fn connect() -> Result<Self, ClientError> {
        let socket_path = crate::env::socket_path().map_err(|e| ClientError::NoSocket(e.to_string()))?;
        if !socket_path.exists() {
            return Err(ClientError::NotRunning(socket_path));
        }
        Ok(Self { socket_path })
    }

    async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        let mut stream = UnixStream::connect(&self.socket_path)
            .await
            .map_err(|e| ClientError::Connect { path: self.socket_path.clone(), source: e })?;

        let bytes = jobq_wire::encode(request)?;
        jobq_wire::write_message(&mut stream, &bytes).await?;

        let bytes = jobq_wire::read_message(&mut stream).await?;
        Ok(jobq_wire::decode(&bytes)?)
    }

    pub async fn submit(&self, priority: i64, max_retries: i64, payload: Payload) -> Result<String, ClientError> {
        match self.send(&Request::Submit { priority, max_retries, payload }).await? {
            Response::Submitted { id } => Ok(id),
            Response::Error { message } => Err(ClientError::Daemon(message)),
            other => Err(ClientError::UnexpectedResponse(other)),
        }
    }

    pub async fn status(&self) -> Result<MetricsSnapshot, ClientError> {
        match self.send(&Request::Status).await? {
            Response::Status { metrics } => Ok(metrics),
            Response::Error { message } => Err(ClientError::Daemon(message)),
            other => Err(ClientError::UnexpectedResponse(other)),
        }
    }

    pub async fn metrics_text(&self) -> Result<String, ClientError> {
        match self.send(&Request::Metrics).await? {
            Response::Metrics { text } => Ok(text),
            Response::Error { message } => Err(ClientError::Daemon(message)),
            other => Err(ClientError::UnexpectedResponse(other)),
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
