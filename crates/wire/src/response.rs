// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use jobq_core::MetricsSnapshot;
use serde::{Deserialize, Serialize};

/// Response from the daemon back to a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    /// `Submit` succeeded; the job is durable in `pending`.
    Submitted { id: String },

    /// `Status` query result: the full counter/gauge snapshot.
    Status { metrics: MetricsSnapshot },

    /// `Metrics` query result: the line-oriented text rendering.
    Metrics { text: String },

    /// Any request that failed — malformed submission, backend unavailable.
    Error { message: String },
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
