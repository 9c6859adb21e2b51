// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use jobq_core::Payload;
use serde::{Deserialize, Serialize};

/// Request from a client (the reference `jobq-cli`, or any caller speaking
/// the wire protocol) to the daemon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Submit a new job. `max_retries: 0` is treated as unspecified and
    /// replaced with the daemon's configured default.
    Submit { priority: i64, max_retries: i64, payload: Payload },

    /// Current queue/store counts and job lifecycle totals.
    Status,

    /// The metrics snapshot, for the line-oriented rendering.
    Metrics,
}
