//! Speaks the length-prefixed `jobq-wire` protocol directly over the
//! daemon's control socket, bypassing `jobq-cli` entirely, to verify the
//! wire format itself rather than just the reference client's use of it.

use crate::prelude::*;
use jobq_wire::{Request, Response};
use tokio::net::UnixStream;

async fn roundtrip(socket_path: &std::path::Path, request: &Request) -> Response {
    let mut stream = UnixStream::connect(socket_path).await.expect("connect to daemon socket");
    let bytes = jobq_wire::encode(request).unwrap();
    jobq_wire::write_message(&mut stream, &bytes).await.unwrap();
    let bytes = jobq_wire::read_message(&mut stream).await.unwrap();
    jobq_wire::decode(&bytes).unwrap()
}

#[tokio::test]
async fn status_request_returns_a_metrics_snapshot() {
    let project = Project::empty();
    let _daemon = project.daemon(&[("JOBQ_WORKER_COUNT", "0")]);
    let socket_path = project.state_path().join("daemon.sock");

    match roundtrip(&socket_path, &Request::Status).await {
        Response::Status { metrics } => assert_eq!(metrics.jobs_submitted, 0),
        other => panic!("expected Response::Status, got {other:?}"),
    }
}

#[tokio::test]
async fn submit_request_returns_an_assigned_id() {
    let project = Project::empty();
    let _daemon = project.daemon(&[("JOBQ_WORKER_COUNT", "0")]);
    let socket_path = project.state_path().join("daemon.sock");

    let request = Request::Submit { priority: 0, max_retries: 0, payload: serde_json::json!({"k": "v"}) };
    match roundtrip(&socket_path, &request).await {
        Response::Submitted { id } => assert!(!id.is_empty()),
        other => panic!("expected Response::Submitted, got {other:?}"),
    }

    match roundtrip(&socket_path, &Request::Status).await {
        Response::Status { metrics } => assert_eq!(metrics.queue_depth, 1),
        other => panic!("expected Response::Status, got {other:?}"),
    }
}

#[tokio::test]
async fn metrics_request_returns_the_line_oriented_rendering() {
    let project = Project::empty();
    let _daemon = project.daemon(&[]);
    let socket_path = project.state_path().join("daemon.sock");

    match roundtrip(&socket_path, &Request::Metrics).await {
        Response::Metrics { text } => assert!(text.contains("queue_depth"), "got: {text}"),
        other => panic!("expected Response::Metrics, got {other:?}"),
    }
}
