// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::action::from_config;
use crate::test_support::{action_env, config};
use serde_json::json;

#[tokio::test]
async fn creates_list_and_appends() {
    let fixture = action_env();
    let action: AddToListAction = from_config(&config(
        json!({"list_key": "spawned_jobs", "value": "j1", "success": "tracked"}),
    ))
    .unwrap();
    let mut ctx = Context::new();

    assert_eq!(
        action.execute(&fixture.env, &mut ctx).await.unwrap().as_deref(),
        Some("tracked")
    );
    assert_eq!(ctx.get("spawned_jobs"), Some(&json!(["j1"])));

    assert_eq!(
        action.execute(&fixture.env, &mut ctx).await.unwrap().as_deref(),
        Some("tracked")
    );
    assert_eq!(ctx.get("spawned_jobs"), Some(&json!(["j1", "j1"])));
}

#[tokio::test]
async fn non_string_values_keep_their_type() {
    let fixture = action_env();
    let action: AddToListAction =
        from_config(&config(json!({"list_key": "results", "value": {"n": 1}}))).unwrap();
    let mut ctx = Context::new();
    action.execute(&fixture.env, &mut ctx).await.unwrap();
    assert_eq!(ctx.get("results"), Some(&json!([{"n": 1}])));
}

#[tokio::test]
async fn non_list_target_is_an_error() {
    let fixture = action_env();
    let action: AddToListAction =
        from_config(&config(json!({"list_key": "flag", "value": "x"}))).unwrap();
    let mut ctx = Context::new();
    ctx.set("flag", true);
    assert_eq!(
        action.execute(&fixture.env, &mut ctx).await.unwrap().as_deref(),
        Some("error")
    );
}
