//! `jobq status` and `jobq metrics` against a running daemon, in both text
//! and `-o json` output modes.

use crate::prelude::*;

#[test]
fn metrics_renders_line_oriented_text() {
    let project = Project::empty();
    let _daemon = project.daemon(&[]);

    project
        .jobq()
        .arg("metrics")
        .passes()
        .stdout_has("jobs_submitted_total")
        .stdout_has("queue_depth")
        .stdout_has("active_workers");
}

#[test]
fn status_json_round_trips_through_metrics_snapshot() {
    let project = Project::empty();
    let _daemon = project.daemon(&[("JOBQ_WORKER_COUNT", "0")]);

    project.jobq().arg("submit").passes();

    let out = project.jobq().args(["-o", "json", "status"]).passes().stdout();
    let metrics: jobq_core::MetricsSnapshot = serde_json::from_str(&out).expect("status -o json should deserialize");

    let expected = jobq_core::MetricsSnapshot { jobs_submitted: 1, queue_depth: 1, ..Default::default() };
    similar_asserts::assert_eq!(metrics, expected);
}

#[test]
fn status_and_metrics_report_a_friendly_message_when_daemon_is_down() {
    let project = Project::empty();

    project.jobq().arg("status").passes().stdout_has("Daemon is not running");
    project.jobq().arg("metrics").passes().stdout_has("Daemon is not running");
}
