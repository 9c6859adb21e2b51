// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Metrics command handler

use anyhow::Result;

use crate::client::{ClientError, DaemonClient};

pub async fn handle() -> Result<()> {
    let client = match DaemonClient::connect() {
        Ok(c) => c,
        Err(ClientError::NotRunning(_)) => {
            println!("Daemon is not running");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let text = client.metrics_text().await?;
    print!("{text}");

    Ok(())
}
