// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::action::{from_config, ActionError};
use crate::test_support::{action_env, config};
use fsm_store::NewJob;
use serde_json::json;

#[tokio::test]
async fn first_claim_wins_second_does_not() {
    let fixture = action_env();
    fixture.env.db.jobs().create(NewJob::new("j1", "echo")).unwrap();

    let action: ClaimJobAction = from_config(&config(json!({"job_id": "j1"}))).unwrap();
    let mut ctx = Context::new();
    assert_eq!(
        action.execute(&fixture.env, &mut ctx).await.unwrap().as_deref(),
        Some("claimed")
    );
    assert_eq!(
        action.execute(&fixture.env, &mut ctx).await.unwrap().as_deref(),
        Some("already_claimed")
    );
}

#[tokio::test]
async fn unknown_job_is_already_claimed() {
    let fixture = action_env();
    let action: ClaimJobAction =
        from_config(&config(json!({"job_id": "ghost", "already_claimed": "taken"}))).unwrap();
    let mut ctx = Context::new();
    assert_eq!(
        action.execute(&fixture.env, &mut ctx).await.unwrap().as_deref(),
        Some("taken")
    );
}

#[test]
fn job_id_is_required() {
    let err = from_config::<ClaimJobAction>(&config(json!({}))).unwrap_err();
    assert!(matches!(err, ActionError::Config(_)));
}
