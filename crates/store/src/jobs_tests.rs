// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::{Database, JobStatus};
use serde_json::json;

fn open_db(dir: &tempfile::TempDir) -> Database {
    Database::open(dir.path().join("pipeline.db")).unwrap()
}

// =============================================================================
// create / get round-trip
// =============================================================================

#[test]
fn create_and_get_round_trips_data() {
    let dir = tempfile::tempdir().unwrap();
    let db = open_db(&dir);
    let data = json!({"payload": "hello", "n": 3});
    db.jobs()
        .create(
            NewJob::new("j1", "echo")
                .machine_type("worker_a")
                .source_job_id("parent")
                .priority(2)
                .data(data.clone())
                .metadata(json!({"origin": "test"})),
        )
        .unwrap();

    let job = db.jobs().get("j1").unwrap().unwrap();
    assert_eq!(job.job_type, "echo");
    assert_eq!(job.machine_type.as_deref(), Some("worker_a"));
    assert_eq!(job.source_job_id.as_deref(), Some("parent"));
    assert_eq!(job.priority, 2);
    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.data, data);
    assert_eq!(job.metadata, json!({"origin": "test"}));
    assert!(job.created_at.is_some());
    assert!(job.started_at.is_none());
}

#[test]
fn empty_blobs_read_back_as_empty_maps() {
    let dir = tempfile::tempdir().unwrap();
    let db = open_db(&dir);
    db.jobs().create(NewJob::new("j1", "echo")).unwrap();
    let job = db.jobs().get("j1").unwrap().unwrap();
    assert_eq!(job.data, json!({}));
    assert_eq!(job.result, json!({}));
}

#[test]
fn malformed_blob_degrades_to_empty_map() {
    let dir = tempfile::tempdir().unwrap();
    let db = open_db(&dir);
    db.jobs().create(NewJob::new("j1", "echo")).unwrap();
    // Corrupt the blob behind the repository's back
    let conn = rusqlite::Connection::open(db.path()).unwrap();
    conn.execute("UPDATE jobs SET data = 'not json' WHERE job_id = 'j1'", [])
        .unwrap();
    drop(conn);

    let job = db.jobs().get("j1").unwrap().unwrap();
    assert_eq!(job.data, json!({}));
}

// =============================================================================
// get_next: priority, ordering, machine filter
// =============================================================================

#[test]
fn get_next_claims_by_priority_then_age() {
    let dir = tempfile::tempdir().unwrap();
    let db = open_db(&dir);
    db.jobs()
        .create(NewJob::new("low", "echo").priority(8))
        .unwrap();
    db.jobs()
        .create(NewJob::new("high", "echo").priority(1))
        .unwrap();
    db.jobs()
        .create(NewJob::new("high_later", "echo").priority(1))
        .unwrap();

    let job = db.jobs().get_next(Some("echo"), None).unwrap().unwrap();
    assert_eq!(job.job_id, "high");
    assert_eq!(job.status, JobStatus::Processing);
    assert!(job.started_at.is_some());

    // Claimed row is no longer pending
    let again = db.jobs().get_next(Some("echo"), None).unwrap().unwrap();
    assert_eq!(again.job_id, "high_later");
}

#[test]
fn get_next_filters_by_type() {
    let dir = tempfile::tempdir().unwrap();
    let db = open_db(&dir);
    db.jobs().create(NewJob::new("a", "render")).unwrap();
    assert!(db.jobs().get_next(Some("echo"), None).unwrap().is_none());
    assert!(db.jobs().get_next(Some("render"), None).unwrap().is_some());
}

#[test]
fn get_next_machine_filter_only_when_given() {
    let dir = tempfile::tempdir().unwrap();
    let db = open_db(&dir);
    db.jobs()
        .create(NewJob::new("tagged", "echo").machine_type("worker_b"))
        .unwrap();

    // A different machine sees nothing
    assert!(db
        .jobs()
        .get_next(Some("echo"), Some("worker_a"))
        .unwrap()
        .is_none());

    // A machine-agnostic caller claims it regardless of the tag
    let job = db.jobs().get_next(Some("echo"), None).unwrap().unwrap();
    assert_eq!(job.job_id, "tagged");
}

#[test]
fn get_next_empty_queue_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let db = open_db(&dir);
    assert!(db.jobs().get_next(None, None).unwrap().is_none());
}

// =============================================================================
// claim / lifecycle
// =============================================================================

#[test]
fn claim_succeeds_once() {
    let dir = tempfile::tempdir().unwrap();
    let db = open_db(&dir);
    db.jobs().create(NewJob::new("j1", "echo")).unwrap();
    assert!(db.jobs().claim("j1").unwrap());
    assert!(!db.jobs().claim("j1").unwrap());
    assert!(!db.jobs().claim("missing").unwrap());
}

#[test]
fn complete_and_fail_are_terminal() {
    let dir = tempfile::tempdir().unwrap();
    let db = open_db(&dir);
    db.jobs().create(NewJob::new("done", "echo")).unwrap();
    db.jobs().create(NewJob::new("bad", "echo")).unwrap();

    db.jobs().complete("done").unwrap();
    db.jobs().fail("bad", "no such file").unwrap();

    let done = db.jobs().get("done").unwrap().unwrap();
    assert_eq!(done.status, JobStatus::Completed);
    assert!(done.completed_at.is_some());

    let bad = db.jobs().get("bad").unwrap().unwrap();
    assert_eq!(bad.status, JobStatus::Failed);
    assert_eq!(bad.error_message.as_deref(), Some("no such file"));
}

#[test]
fn reset_to_pending_only_from_processing() {
    let dir = tempfile::tempdir().unwrap();
    let db = open_db(&dir);
    db.jobs().create(NewJob::new("j1", "echo")).unwrap();
    assert!(!db.jobs().reset_to_pending("j1", "stuck").unwrap());

    db.jobs().claim("j1").unwrap();
    assert!(db.jobs().reset_to_pending("j1", "stuck").unwrap());
    let job = db.jobs().get("j1").unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Pending);
    assert!(job.started_at.is_none());
}

// =============================================================================
// batch reads
// =============================================================================

#[test]
fn get_pending_does_not_mutate() {
    let dir = tempfile::tempdir().unwrap();
    let db = open_db(&dir);
    for i in 0..5 {
        db.jobs()
            .create(NewJob::new(format!("j{i}"), "echo"))
            .unwrap();
    }
    let pending = db.jobs().get_pending(Some("echo"), None, Some(3)).unwrap();
    assert_eq!(pending.len(), 3);
    assert_eq!(
        db.jobs()
            .count(Some(JobStatus::Pending), None, None)
            .unwrap(),
        5
    );
}

#[test]
fn list_and_count_filter_by_status() {
    let dir = tempfile::tempdir().unwrap();
    let db = open_db(&dir);
    db.jobs().create(NewJob::new("a", "echo")).unwrap();
    db.jobs().create(NewJob::new("b", "echo")).unwrap();
    db.jobs().complete("a").unwrap();

    assert_eq!(
        db.jobs()
            .count(Some(JobStatus::Completed), None, None)
            .unwrap(),
        1
    );
    let listed = db.jobs().list(Some(JobStatus::Pending), None, None, 50).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].job_id, "b");
}

#[test]
fn statuses_maps_tracked_ids() {
    let dir = tempfile::tempdir().unwrap();
    let db = open_db(&dir);
    db.jobs().create(NewJob::new("a", "echo")).unwrap();
    db.jobs().create(NewJob::new("b", "echo")).unwrap();
    db.jobs().complete("b").unwrap();

    let statuses = db
        .jobs()
        .statuses(&["a".into(), "b".into(), "ghost".into()])
        .unwrap();
    assert_eq!(statuses.get("a"), Some(&JobStatus::Pending));
    assert_eq!(statuses.get("b"), Some(&JobStatus::Completed));
    assert!(!statuses.contains_key("ghost"));
}
