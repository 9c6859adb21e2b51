// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types shared across crates that depend only on `jobq-core`.

use thiserror::Error;

/// Errors raised while validating submission fields into a [`crate::job::Job`].
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("priority must be non-negative, got {0}")]
    NegativePriority(i64),
    #[error("max_retries must be non-negative, got {0}")]
    NegativeMaxRetries(i64),
}
