// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `jobq`: command-line client for the `jobqd` daemon's submission/control
//! socket. Talks the same wire protocol (`jobq-wire`) the daemon's listener
//! accepts — this binary is the reference client, not a privileged one.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use anyhow::Result;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};

mod client;
mod color;
mod commands;
mod env;
mod exit_error;
mod output;

use commands::{metrics, status, submit};
use exit_error::ExitError;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "jobq", version, about = "Client for the jobq daemon")]
struct Cli {
    /// Output format for commands that print structured data
    #[arg(long, short = 'o', global = true, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a new job to the queue
    Submit(submit::SubmitArgs),
    /// Show current queue/worker status
    Status,
    /// Print line-oriented metrics
    Metrics,
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Cli::command().styles(color::styles()).get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let result = match cli.command {
        Commands::Submit(args) => submit::handle(args, cli.output).await,
        Commands::Status => status::handle(cli.output).await,
        Commands::Metrics => metrics::handle().await,
    };

    if let Err(err) = result {
        if let Some(exit_err) = err.downcast_ref::<ExitError>() {
            if !exit_err.message.is_empty() {
                eprintln!("{}", exit_err.message);
            }
            std::process::exit(exit_err.code);
        }
        eprintln!("error: {err}");
        std::process::exit(1);
    }

    Ok(())
}
