// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Submit command handler

use anyhow::Result;
use clap::Args;

use crate::client::{ClientError, DaemonClient};
use crate::exit_error::ExitError;
use crate::output::OutputFormat;

#[derive(Args)]
pub struct SubmitArgs {
    /// Static priority; higher runs first (ties broken by queue age)
    #[arg(long, default_value_t = 0)]
    pub priority: i64,

    /// Maximum retry attempts before the job is moved to the dead letter
    /// state. 0 uses the daemon's configured default.
    #[arg(long = "max-retries", default_value_t = 0)]
    pub max_retries: i64,

    /// Payload as a JSON value (object, array, string, number, or null)
    pub data: Option<String>,

    /// Payload object fields (can be repeated: --var key=value). Merged
    /// into `data` if both are given; ignored if `data` is not an object.
    #[arg(long = "var", value_parser = parse_key_value)]
    pub var: Vec<(String, String)>,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let pos = s.find('=').ok_or_else(|| format!("invalid input format '{}': must be key=value", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

fn build_payload(data: Option<String>, var: Vec<(String, String)>) -> Result<serde_json::Value> {
    if data.is_none() && var.is_empty() {
        return Ok(serde_json::Value::Null);
    }

    let mut map = match data {
        Some(json_str) => {
            let val: serde_json::Value =
                serde_json::from_str(&json_str).map_err(|e| anyhow::anyhow!("invalid JSON payload: {}", e))?;
            match val {
                serde_json::Value::Object(m) => m,
                other if var.is_empty() => return Ok(other),
                _ => anyhow::bail!("--var can only be merged into a JSON object payload"),
            }
        }
        None => serde_json::Map::new(),
    };

    for (k, v) in var {
        map.insert(k, serde_json::Value::String(v));
    }

    Ok(serde_json::Value::Object(map))
}

pub async fn handle(args: SubmitArgs, format: OutputFormat) -> Result<()> {
    let payload = build_payload(args.data, args.var)?;

    let client = match DaemonClient::connect() {
        Ok(c) => c,
        Err(ClientError::NotRunning(_)) => {
            return Err(ExitError::new(1, "daemon is not running").into());
        }
        Err(e) => return Err(e.into()),
    };

    let id = client.submit(args.priority, args.max_retries, payload).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "id": id }))?);
        }
        OutputFormat::Text => {
            println!("Submitted job {id}");
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "submit_tests.rs"]
mod tests;
