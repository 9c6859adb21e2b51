// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status command handler

use anyhow::Result;

use crate::client::{ClientError, DaemonClient};
use crate::output::OutputFormat;

pub async fn handle(format: OutputFormat) -> Result<()> {
    let client = match DaemonClient::connect() {
        Ok(c) => c,
        Err(ClientError::NotRunning(_)) => {
            println!("Daemon is not running");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let metrics = client.status().await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&metrics)?);
        }
        OutputFormat::Text => {
            println!("jobs submitted:  {}", metrics.jobs_submitted);
            println!("jobs completed:  {}", metrics.jobs_completed);
            println!("jobs failed:     {}", metrics.jobs_failed);
            println!("jobs retried:    {}", metrics.jobs_retries);
            println!("jobs dead:       {}", metrics.jobs_dead);
            println!("queue depth:     {}", metrics.queue_depth);
            println!("in flight:       {}", metrics.inflight);
            println!("active workers:  {}", metrics.active_workers);
        }
    }

    Ok(())
}
