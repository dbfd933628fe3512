//! Single-worker happy path: claim a job, run its command, complete it.

use crate::prelude::*;
use fsm_store::{JobStatus, NewJob};
use serde_json::json;

#[test]
fn worker_processes_one_job_to_completion() {
    let ws = Workspace::new("queue");
    let config = ws.write_config(
        r#"
metadata:
  machine_name: echo_worker
initial_state: waiting
states: [waiting, working, done, stopped]
transitions:
  - { from: waiting, event: start, to: waiting }
  - { from: waiting, event: new_job, to: working }
  - { from: working, event: job_done, to: done }
  - { from: done, event: job_completed, to: stopped }
  - { from: "*", event: stop, to: stopped }
actions:
  waiting:
    - { type: check_database_queue, job_type: echo }
  working:
    - { type: bash, command: "echo {payload}" }
  done:
    - { type: complete_job, job_id: "{id}", success: job_completed }
"#,
    );

    ws.db()
        .jobs()
        .create(NewJob::new("job-1", "echo").data(json!({"payload": "hello"})))
        .unwrap();

    statemachine(&ws, &config).assert().success();

    let job = ws.db().jobs().get("job-1").unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert!(job.started_at.is_some());
    assert!(job.completed_at.is_some());
}

#[test]
fn failed_command_marks_the_job_failed() {
    let ws = Workspace::new("failjob");
    let config = ws.write_config(
        r#"
metadata:
  machine_name: fail_worker
initial_state: waiting
states: [waiting, working, error_cleanup, stopped]
transitions:
  - { from: waiting, event: new_job, to: working }
  - { from: working, event: error, to: error_cleanup }
  - { from: error_cleanup, event: job_failed, to: stopped }
actions:
  waiting:
    - { type: check_database_queue, job_type: echo }
  working:
    - { type: bash, command: "exit 12" }
  error_cleanup:
    - { type: fail_job, job_id: "{id}", success: job_failed }
"#,
    );

    ws.db().jobs().create(NewJob::new("job-2", "echo")).unwrap();

    statemachine(&ws, &config).assert().success();

    let job = ws.db().jobs().get("job-2").unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.error_message.unwrap().contains("exit 12"));
}
