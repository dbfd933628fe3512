// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::action::from_config;
use crate::test_support::{action_env, config};
use serde_json::json;

#[tokio::test]
async fn clears_only_matching_pending_events() {
    let fixture = action_env();
    let events = fixture.env.db.machine_events();
    events.send("worker_b", "ready_for_next_job", None, None, None).unwrap();
    events.send("worker_b", "ready_for_next_job", None, None, None).unwrap();
    events.send("worker_b", "go", None, None, None).unwrap();

    let action: ClearEventsAction = from_config(&config(json!({
        "event_types": "ready_for_next_job",
        "target_machine": "worker_b",
    })))
    .unwrap();
    let mut ctx = Context::new();
    let event = action.execute(&fixture.env, &mut ctx).await.unwrap();
    assert_eq!(event.as_deref(), Some("events_cleared"));

    let remaining = fixture.env.db.machine_events().pending("worker_b").unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].event_type, "go");
}

#[tokio::test]
async fn accepts_a_list_of_types() {
    let fixture = action_env();
    let events = fixture.env.db.machine_events();
    events.send("b", "a1", None, None, None).unwrap();
    events.send("b", "a2", None, None, None).unwrap();

    let action: ClearEventsAction = from_config(&config(json!({
        "event_types": ["a1", "a2"],
        "target_machine": "b",
    })))
    .unwrap();
    let mut ctx = Context::new();
    action.execute(&fixture.env, &mut ctx).await.unwrap();
    assert!(fixture.env.db.machine_events().pending("b").unwrap().is_empty());
}

#[tokio::test]
async fn nothing_matching_reports_no_events() {
    let fixture = action_env();
    let action: ClearEventsAction = from_config(&config(json!({
        "event_types": "ghost_event",
        "target_machine": "b",
    })))
    .unwrap();
    let mut ctx = Context::new();
    assert_eq!(
        action.execute(&fixture.env, &mut ctx).await.unwrap().as_deref(),
        Some("no_events_to_clear")
    );
}

#[tokio::test]
async fn missing_target_or_types_is_a_noop() {
    let fixture = action_env();
    let mut ctx = Context::new();

    let no_types: ClearEventsAction =
        from_config(&config(json!({"target_machine": "b"}))).unwrap();
    assert_eq!(
        no_types.execute(&fixture.env, &mut ctx).await.unwrap().as_deref(),
        Some("no_events_to_clear")
    );

    let no_target: ClearEventsAction =
        from_config(&config(json!({"event_types": "x"}))).unwrap();
    assert_eq!(
        no_target.execute(&fixture.env, &mut ctx).await.unwrap().as_deref(),
        Some("no_events_to_clear")
    );
}
