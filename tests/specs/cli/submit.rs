//! `jobq submit` end-to-end: payload construction (`--var`, positional
//! JSON data) and the assigned id round-tripping through `status`.

use crate::prelude::*;

#[test]
fn submit_with_no_payload_increments_queue_depth() {
    let project = Project::empty();
    let _daemon = project.daemon(&[("JOBQ_WORKER_COUNT", "0")]);

    let out = project.jobq().arg("submit").passes().stdout();
    assert!(out.starts_with("Submitted job "), "unexpected submit output: {out}");

    let status = project.jobq().args(["-o", "json", "status"]).passes().stdout();
    let metrics: jobq_core::MetricsSnapshot = serde_json::from_str(&status).unwrap();
    assert_eq!(metrics.queue_depth, 1);
}

#[test]
fn submit_accepts_json_data_and_vars_merged_together() {
    let project = Project::empty();
    let _daemon = project.daemon(&[("JOBQ_WORKER_COUNT", "0")]);

    project
        .jobq()
        .args(["submit", "--priority", "5", r#"{"kind":"report"}"#, "--var", "region=us-east"])
        .passes()
        .stdout_has("Submitted job ");

    let status = project.jobq().args(["-o", "json", "status"]).passes().stdout();
    let metrics: jobq_core::MetricsSnapshot = serde_json::from_str(&status).unwrap();
    assert_eq!(metrics.queue_depth, 1);
}

#[test]
fn submit_rejects_invalid_json_payload() {
    let project = Project::empty();
    let _daemon = project.daemon(&[]);

    project.jobq().args(["submit", "not-json"]).fails();
}

#[test]
fn submit_json_output_includes_the_assigned_id() {
    let project = Project::empty();
    let _daemon = project.daemon(&[("JOBQ_WORKER_COUNT", "0")]);

    let out = project.jobq().args(["-o", "json", "submit"]).passes().stdout();
    let value: serde_json::Value = serde_json::from_str(&out).expect("submit -o json should be valid JSON");
    assert!(value["id"].is_string(), "expected an \"id\" field, got: {out}");
}
