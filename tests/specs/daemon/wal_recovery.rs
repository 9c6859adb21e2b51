//! Crash recovery: a job still `inflight` in the durable store when the
//! daemon dies unexpectedly is reclaimed by the next startup's recovery
//! sweep rather than lost or stuck forever.

use crate::prelude::*;

fn snapshot(project: &Project) -> jobq_core::MetricsSnapshot {
    let status = project.jobq().args(["-o", "json", "status"]).passes().stdout();
    serde_json::from_str(&status).expect("status should be valid JSON")
}

#[test]
fn inflight_job_survives_a_crash_and_completes_after_restart() {
    let project = Project::empty();

    {
        // A single worker with an artificially slow executor gives us a
        // reliable window to crash the daemon while the job is `inflight`.
        let mut daemon = project.daemon(&[("JOBQ_WORKER_COUNT", "1"), ("JOBQ_EXECUTE_DELAY_MS", "60000")]);

        project.jobq().arg("submit").passes();

        let picked_up = wait_for(WAIT_MAX_MS, || snapshot(&project).inflight == 1);
        assert!(picked_up, "job should be picked up and marked in-flight\n{}", daemon.log());

        daemon.kill();
    }

    // Restart with no artificial delay and a worker present: startup's
    // unconditional in-flight recovery should requeue the orphaned job and
    // the worker should then run it to completion.
    let _daemon = project.daemon(&[("JOBQ_WORKER_COUNT", "1")]);

    let recovered = wait_for(WAIT_MAX_MS, || {
        let metrics = snapshot(&project);
        metrics.jobs_completed == 1 && metrics.inflight == 0 && metrics.queue_depth == 0
    });
    assert!(recovered, "job left in-flight by the crashed daemon should complete after recovery");
}

#[test]
fn multiple_inflight_jobs_are_all_recovered_after_a_crash() {
    let project = Project::empty();

    {
        let mut daemon = project.daemon(&[("JOBQ_WORKER_COUNT", "3"), ("JOBQ_EXECUTE_DELAY_MS", "60000")]);

        for _ in 0..3 {
            project.jobq().arg("submit").passes();
        }

        let all_inflight = wait_for(WAIT_MAX_MS, || snapshot(&project).inflight == 3);
        assert!(all_inflight, "all 3 jobs should be in-flight\n{}", daemon.log());

        daemon.kill();
    }

    let _daemon = project.daemon(&[("JOBQ_WORKER_COUNT", "3")]);

    let recovered = wait_for(WAIT_MAX_MS, || {
        let metrics = snapshot(&project);
        metrics.jobs_completed == 3 && metrics.inflight == 0
    });
    assert!(recovered, "all 3 in-flight jobs should be recovered and completed");
}
