//! Daemon startup/shutdown lifecycle: socket/lock-file creation, the
//! single-instance lock, and the client's behavior when no daemon is up.

use crate::prelude::*;

#[test]
fn status_reports_not_running_before_daemon_starts() {
    let project = Project::empty();

    project.jobq().arg("status").passes().stdout_has("Daemon is not running");
}

#[test]
fn submit_fails_when_daemon_not_running() {
    let project = Project::empty();

    // Submit is the one command that surfaces a hard failure (exit code 1,
    // `ExitError`) rather than a friendly message, since it cannot silently
    // no-op the way status/metrics do.
    project.jobq().arg("submit").fails().stderr_has("daemon is not running");
}

#[test]
fn daemon_creates_socket_and_lock_files() {
    let project = Project::empty();
    let _daemon = project.daemon(&[]);

    assert!(project.state_path().join("daemon.sock").exists(), "control socket should exist");
    assert!(project.state_path().join("daemon.pid").exists(), "lock/pid file should exist");
}

#[test]
fn status_reports_metrics_once_daemon_is_up() {
    let project = Project::empty();
    let _daemon = project.daemon(&[]);

    project
        .jobq()
        .arg("status")
        .passes()
        .stdout_has("jobs submitted:")
        .stdout_has("queue depth:")
        .stdout_has("active workers:");
}

#[test]
fn second_daemon_instance_fails_to_acquire_the_lock() {
    let project = Project::empty();
    let _daemon = project.daemon(&[]);

    let second = std::process::Command::new(env!("CARGO_BIN_EXE_jobqd"))
        .env("JOBQ_STATE_DIR", project.state_path())
        .output()
        .expect("second jobqd should run");

    assert!(!second.status.success(), "a second daemon instance must not start while one holds the lock");
    let stderr = String::from_utf8_lossy(&second.stderr);
    assert!(stderr.contains("already running"), "stderr should mention the lock conflict, got:\n{stderr}");

    // The first daemon must be undisturbed by the failed second instance.
    project.jobq().arg("status").passes().stdout_has("jobs submitted:");
}

#[test]
fn daemon_socket_bind_failure_reports_a_clear_error() {
    let project = Project::empty();

    // A control-socket path beyond the platform's sun_path limit (108 bytes
    // on Linux) makes UnixListener::bind fail deterministically.
    let long_suffix = "x".repeat(120);
    let long_state_dir = project.state_path().join(long_suffix);
    std::fs::create_dir_all(&long_state_dir).expect("create nested state dir");

    let output = std::process::Command::new(env!("CARGO_BIN_EXE_jobqd"))
        .env("JOBQ_STATE_DIR", &long_state_dir)
        .output()
        .expect("jobqd should run");

    assert!(!output.status.success(), "daemon should refuse to start with an unbindable socket path");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to bind socket"), "stderr should name the bind failure, got:\n{stderr}");
}

#[test]
fn daemon_exits_cleanly_on_sigterm_and_removes_its_files() {
    let project = Project::empty();
    let mut daemon = project.daemon(&[]);

    daemon.stop();

    assert!(!daemon.is_alive(), "daemon should have exited after SIGTERM");
    assert!(!project.state_path().join("daemon.sock").exists(), "socket should be removed on graceful shutdown");
    assert!(!project.state_path().join("daemon.pid").exists(), "lock file should be removed on graceful shutdown");

    project.jobq().arg("status").passes().stdout_has("Daemon is not running");
}
