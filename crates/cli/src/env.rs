// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment variable access for locating the running daemon. Mirrors
//! `jobq-daemon`'s own state directory precedence so the client and the
//! daemon agree on a socket path without sharing a crate.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvError {
    #[error("cannot determine state directory: set JOBQ_STATE_DIR or HOME")]
    NoStateDir,
}

/// Resolve state directory: `JOBQ_STATE_DIR` > `XDG_STATE_HOME/jobq` >
/// `~/.local/state/jobq`.
pub fn state_dir() -> Result<PathBuf, EnvError> {
    if let Ok(dir) = std::env::var("JOBQ_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("jobq"));
    }
    let home = std::env::var("HOME").map_err(|_| EnvError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/jobq"))
}

/// Path to the daemon's Unix domain socket.
pub fn socket_path() -> Result<PathBuf, EnvError> {
    Ok(state_dir()?.join("daemon.sock"))
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
