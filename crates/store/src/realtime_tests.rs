// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::Database;
use serde_json::json;

fn open_db(dir: &tempfile::TempDir) -> Database {
    Database::open(dir.path().join("pipeline.db")).unwrap()
}

#[test]
fn log_then_read_round_trips_payload() {
    let dir = tempfile::tempdir().unwrap();
    let db = open_db(&dir);
    let payload = json!({"from_state": "waiting", "to_state": "working"});
    let id = db
        .realtime_events()
        .log("worker_a", "state_change", &payload)
        .unwrap();

    let events = db.realtime_events().get_unconsumed(0, 50).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, id);
    assert_eq!(events[0].event_type, "state_change");
    assert_eq!(events[0].payload, payload);
}

#[test]
fn log_swallows_errors() {
    let dir = tempfile::tempdir().unwrap();
    let db = open_db(&dir);
    // Break the table out from under the writer
    let conn = rusqlite::Connection::open(db.path()).unwrap();
    conn.execute("DROP TABLE realtime_events", []).unwrap();
    drop(conn);

    assert!(db.realtime_events().log("m", "x", &json!({})).is_none());
}

#[test]
fn unconsumed_respects_since_id_and_order() {
    let dir = tempfile::tempdir().unwrap();
    let db = open_db(&dir);
    let first = db.realtime_events().log("m", "a", &json!({})).unwrap();
    let second = db.realtime_events().log("m", "b", &json!({})).unwrap();
    assert!(second > first);

    let events = db.realtime_events().get_unconsumed(first, 50).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, "b");
}

#[test]
fn consumed_events_disappear_and_cleanup_removes_them() {
    let dir = tempfile::tempdir().unwrap();
    let db = open_db(&dir);
    let id = db.realtime_events().log("m", "a", &json!({})).unwrap();
    assert!(db.realtime_events().mark_consumed(&[id]).unwrap());
    assert!(db.realtime_events().get_unconsumed(0, 50).unwrap().is_empty());

    // Nothing old enough yet
    assert_eq!(db.realtime_events().cleanup_consumed(1).unwrap(), 0);
    // Zero-hour cutoff is "now", but consumed_at == now is not strictly
    // older, so age the row artificially
    let conn = rusqlite::Connection::open(db.path()).unwrap();
    conn.execute(
        "UPDATE realtime_events SET consumed_at = datetime('now', '-2 hours')",
        [],
    )
    .unwrap();
    drop(conn);
    assert_eq!(db.realtime_events().cleanup_consumed(1).unwrap(), 1);
}

#[test]
fn mark_consumed_empty_batch_is_true() {
    let dir = tempfile::tempdir().unwrap();
    let db = open_db(&dir);
    assert!(db.realtime_events().mark_consumed(&[]).unwrap());
}
