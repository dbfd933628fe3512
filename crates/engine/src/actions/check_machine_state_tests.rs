// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::action::from_config;
use crate::test_support::{action_env, config};
use serde_json::json;

#[tokio::test]
async fn fresh_expected_state_passes() {
    let fixture = action_env();
    fixture
        .env
        .db
        .pipeline_results()
        .record_state_change("peer", "waiting", "start", None)
        .unwrap();

    let action: CheckMachineStateAction = from_config(&config(json!({
        "target_machine": "peer",
        "expected_states": ["waiting", "working"],
    })))
    .unwrap();
    let mut ctx = Context::new();
    assert_eq!(
        action.execute(&fixture.env, &mut ctx).await.unwrap().as_deref(),
        Some("in_expected_state")
    );
}

#[tokio::test]
async fn unexpected_state_is_stored_in_context() {
    let fixture = action_env();
    fixture
        .env
        .db
        .pipeline_results()
        .record_state_change("peer", "error_cleanup", "error", None)
        .unwrap();

    let action: CheckMachineStateAction = from_config(&config(json!({
        "target_machine": "peer",
        "expected_states": ["waiting"],
    })))
    .unwrap();
    let mut ctx = Context::new();
    assert_eq!(
        action.execute(&fixture.env, &mut ctx).await.unwrap().as_deref(),
        Some("unexpected_state")
    );
    assert_eq!(
        ctx.get("unexpected_machine_state"),
        Some(&json!("error_cleanup"))
    );
}

#[tokio::test]
async fn no_state_rows_means_not_running() {
    let fixture = action_env();
    let action: CheckMachineStateAction = from_config(&config(json!({
        "target_machine": "ghost",
        "expected_states": ["waiting"],
    })))
    .unwrap();
    let mut ctx = Context::new();
    assert_eq!(
        action.execute(&fixture.env, &mut ctx).await.unwrap().as_deref(),
        Some("not_running")
    );
}

#[tokio::test]
async fn stale_state_rows_mean_not_running() {
    let fixture = action_env();
    fixture
        .env
        .db
        .pipeline_results()
        .record_state_change("peer", "waiting", "start", None)
        .unwrap();

    // A negative freshness threshold makes any row stale
    let action: CheckMachineStateAction = from_config(&config(json!({
        "target_machine": "peer",
        "expected_states": ["waiting"],
        "timeout_seconds": -1,
    })))
    .unwrap();
    let mut ctx = Context::new();
    assert_eq!(
        action.execute(&fixture.env, &mut ctx).await.unwrap().as_deref(),
        Some("not_running")
    );
}
