// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The job record: an immutable-identity value with a mutable attempt count.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;

crate::define_id! {
    /// Unique, client-opaque identifier for a job.
    ///
    /// Ids are either generated fresh by an ingress via [`JobId::new`]
    /// or parsed from a caller-supplied string via [`JobId::from_string`] —
    /// this crate does not assume it owns id assignment.
    pub struct JobId("job-");
}

/// An opaque, serializable payload. The queue never interprets its contents.
pub type Payload = Value;

/// A unit of deferred work.
///
/// `id` and `created_at` are fixed at first submission and never change
/// across retries. `attempts` increments on each failed execution;
/// `priority` and `max_retries` are set at submission time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub created_at: u64,
    pub priority: u32,
    pub payload: Payload,
    pub attempts: u32,
    pub max_retries: u32,
}

impl Job {
    /// Construct a freshly submitted job with zero attempts.
    pub fn new(id: JobId, created_at: u64, priority: u32, payload: Payload, max_retries: u32) -> Self {
        Self { id, created_at, priority, payload, attempts: 0, max_retries }
    }

    /// Effective priority at a given wall-clock instant: static priority plus
    /// whole seconds of age. Strictly increases with wall time, guaranteeing
    /// eventual service for any job regardless of its static priority.
    pub fn effective_priority(&self, now_epoch_ms: u64) -> u64 {
        let age_ms = now_epoch_ms.saturating_sub(self.created_at);
        self.priority as u64 + age_ms / 1000
    }

    /// True once `attempts` has exceeded `max_retries` — the job must not be
    /// requeued and instead transitions to terminal (dead-lettered).
    pub fn exhausted(&self) -> bool {
        self.attempts > self.max_retries
    }

    /// Returns a copy with `attempts` incremented by one, as performed by
    /// `handle_failure` before deciding between retry and dead-letter.
    pub fn next_attempt(&self) -> Self {
        let mut next = self.clone();
        next.attempts += 1;
        next
    }

    crate::setters! {
        set { priority: u32 }
        set { max_retries: u32 }
    }
}

/// Validate raw submission fields from an ingress request.
///
/// `max_retries = 0` is treated as unspecified (the source this behaviour
/// was distilled from treats zero the same way) and replaced with
/// `default_max_retries`. Negative inputs are rejected rather than silently
/// clamped, since a client sending a negative number is almost certainly a
/// bug on the caller's side.
pub fn validate_submission(
    priority: i64,
    max_retries: i64,
    default_max_retries: u32,
) -> Result<(u32, u32), CoreError> {
    if priority < 0 {
        return Err(CoreError::NegativePriority(priority));
    }
    if max_retries < 0 {
        return Err(CoreError::NegativeMaxRetries(max_retries));
    }
    let max_retries = if max_retries == 0 { default_max_retries } else { max_retries as u32 };
    Ok((priority as u32, max_retries))
}

crate::builder! {
    pub struct JobBuilder => Job {
        into { id: JobId = JobId::new() }
        set { created_at: u64 = 0 }
        set { priority: u32 = 0 }
        into { payload: Payload = Payload::Null }
        set { attempts: u32 = 0 }
        set { max_retries: u32 = 3 }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
