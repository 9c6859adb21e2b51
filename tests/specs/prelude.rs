// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test harness: an isolated project directory, a managed `jobqd`
//! child process, and a fluent assertion wrapper over command output.
//!
//! This crate has no `daemon start`/`stop` CLI surface (out of scope for
//! `jobq-cli`, see SPEC_FULL.md), so tests manage the daemon process
//! directly rather than through the client binary.

use std::path::PathBuf;
use std::process::{Child, Command as StdCommand, Stdio};
use std::time::{Duration, Instant};

use assert_cmd::Command;

pub const WAIT_MAX_MS: u64 = 5_000;

/// Poll `cond` every 25ms until it returns `true` or `max_ms` elapses.
/// Always evaluates `cond` once more at the deadline before giving up, so a
/// condition that becomes true exactly as the clock runs out isn't missed.
pub fn wait_for(max_ms: u64, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_millis(max_ms);
    loop {
        if cond() {
            return true;
        }
        if Instant::now() >= deadline {
            return cond();
        }
        std::thread::sleep(Duration::from_millis(25));
    }
}

/// An isolated `JOBQ_STATE_DIR` for one test.
pub struct Project {
    dir: tempfile::TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self { dir: tempfile::tempdir().expect("create temp project dir") }
    }

    pub fn state_path(&self) -> PathBuf {
        self.dir.path().join("state")
    }

    /// A `jobq` client command pre-wired to this project's state directory.
    pub fn jobq(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_jobq"));
        cmd.env("JOBQ_STATE_DIR", self.state_path());
        cmd
    }

    /// Start a `jobqd` daemon against this project. See [`Daemon::start`].
    pub fn daemon(&self, extra_env: &[(&str, &str)]) -> Daemon {
        Daemon::start(self, extra_env)
    }
}

/// A running `jobqd` process, spawned directly as a child of the test
/// binary — the test is the "operator" driving its lifecycle.
pub struct Daemon {
    child: Child,
    log_path: PathBuf,
}

impl Daemon {
    /// Spawn `jobqd` against `project`'s state directory with `extra_env`
    /// applied on top of it (e.g. `JOBQ_WORKER_COUNT`, `JOBQ_EXECUTE_DELAY_MS`).
    /// Blocks until the control socket exists or `WAIT_MAX_MS` elapses.
    pub fn start(project: &Project, extra_env: &[(&str, &str)]) -> Self {
        let log_path = project.dir.path().join("daemon.log");
        let log_file = std::fs::File::create(&log_path).expect("create daemon log file");

        let mut cmd = StdCommand::new(env!("CARGO_BIN_EXE_jobqd"));
        cmd.env("JOBQ_STATE_DIR", project.state_path());
        cmd.env("RUST_LOG", "info");
        for (key, value) in extra_env {
            cmd.env(key, value);
        }
        cmd.stdout(Stdio::from(log_file.try_clone().expect("clone log file handle")));
        cmd.stderr(Stdio::from(log_file));

        let child = cmd.spawn().expect("spawn jobqd");
        let daemon = Self { child, log_path };

        let socket_path = project.state_path().join("daemon.sock");
        let up = wait_for(WAIT_MAX_MS, || socket_path.exists());
        assert!(up, "jobqd did not create its control socket in time\n=== LOG ===\n{}", daemon.log());
        daemon
    }

    pub fn log(&self) -> String {
        std::fs::read_to_string(&self.log_path).unwrap_or_default()
    }

    pub fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// SIGKILL: simulates a crash, skipping graceful shutdown entirely.
    pub fn kill(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }

    /// SIGTERM and wait for the process to exit on its own.
    pub fn stop(&mut self) {
        let pid = self.child.id().to_string();
        let _ = StdCommand::new("kill").arg("-TERM").arg(&pid).status();
        let _ = self.child.wait();
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        // A test that already killed/stopped the daemon has nothing left to
        // reap; one that didn't must not leak a process past its test.
        if self.is_alive() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// Fluent assertions over a finished command's output.
pub struct Outcome {
    output: std::process::Output,
}

impl Outcome {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(self.stdout().contains(needle), "expected stdout to contain {needle:?}, got:\n{}", self.stdout());
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(self.stderr().contains(needle), "expected stderr to contain {needle:?}, got:\n{}", self.stderr());
        self
    }
}

pub trait CommandExt {
    /// Run the command, asserting it exits successfully.
    fn passes(self) -> Outcome;
    /// Run the command, asserting it exits with a failure status.
    fn fails(self) -> Outcome;
}

impl CommandExt for Command {
    fn passes(mut self) -> Outcome {
        let assert = self.assert().success();
        Outcome { output: assert.get_output().clone() }
    }

    fn fails(mut self) -> Outcome {
        let assert = self.assert().failure();
        Outcome { output: assert.get_output().clone() }
    }
}
