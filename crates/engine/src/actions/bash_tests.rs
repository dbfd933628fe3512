// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::action::from_config;
use crate::test_support::{action_env, config, context_with_job};
use serde_json::json;

fn bash(config_value: serde_json::Value) -> BashAction {
    from_config(&config(config_value)).unwrap()
}

// =============================================================================
// Exit-code routing
// =============================================================================

#[tokio::test]
async fn zero_exit_returns_default_success_event() {
    let fixture = action_env();
    let action = bash(json!({"command": "true"}));
    let mut ctx = Context::new();
    let event = action.execute(&fixture.env, &mut ctx).await.unwrap();
    assert_eq!(event.as_deref(), Some("job_done"));
}

#[tokio::test]
async fn success_event_is_overridable() {
    let fixture = action_env();
    let action = bash(json!({"command": "true", "success": "generation_complete"}));
    let mut ctx = Context::new();
    let event = action.execute(&fixture.env, &mut ctx).await.unwrap();
    assert_eq!(event.as_deref(), Some("generation_complete"));
}

#[tokio::test]
async fn mapped_exit_code_keeps_current_job() {
    let fixture = action_env();
    let action = bash(json!({
        "command": "exit 7",
        "error_mappings": {"7": "retryable"},
    }));
    let mut ctx = context_with_job("j1", json!({}));

    let event = action.execute(&fixture.env, &mut ctx).await.unwrap();
    assert_eq!(event.as_deref(), Some("retryable"));
    // Recoverable failure: the job stays for the FSM to route
    assert!(ctx.contains("current_job"));
    assert_eq!(ctx.get("last_error_exit_code"), Some(&json!(7)));
    assert_eq!(ctx.get_str("last_error_action"), Some("bash"));
}

#[tokio::test]
async fn unmapped_exit_code_clears_current_job() {
    let fixture = action_env();
    let action = bash(json!({"command": "exit 3"}));
    let mut ctx = context_with_job("j1", json!({}));

    let event = action.execute(&fixture.env, &mut ctx).await.unwrap();
    assert_eq!(event.as_deref(), Some("error"));
    assert!(!ctx.contains("current_job"));
    assert!(ctx.get_str("last_error").unwrap().contains("exit 3"));
    assert!(ctx.get_str("last_error_command").is_some());
}

#[tokio::test]
async fn timeout_clears_job_and_unsets_exit_code() {
    let fixture = action_env();
    let action = bash(json!({"command": "sleep 30", "timeout": 0.2}));
    let mut ctx = context_with_job("j1", json!({}));
    ctx.set("last_error_exit_code", 1);

    let event = action.execute(&fixture.env, &mut ctx).await.unwrap();
    assert_eq!(event.as_deref(), Some("error"));
    assert!(!ctx.contains("current_job"));
    assert!(ctx.get_str("last_error").unwrap().contains("timed out"));
    assert!(!ctx.contains("last_error_exit_code"));
}

#[tokio::test]
async fn missing_command_is_an_error() {
    let fixture = action_env();
    let action = bash(json!({}));
    let mut ctx = Context::new();
    let event = action.execute(&fixture.env, &mut ctx).await.unwrap();
    assert_eq!(event.as_deref(), Some("error"));
}

// =============================================================================
// Command sourcing and substitution
// =============================================================================

#[tokio::test]
async fn job_data_command_wins_over_config() {
    let fixture = action_env();
    let action = bash(json!({"command": "exit 9"}));
    let mut ctx = context_with_job("j1", json!({"command": "true"}));
    let event = action.execute(&fixture.env, &mut ctx).await.unwrap();
    assert_eq!(event.as_deref(), Some("job_done"));
}

#[test]
fn fallback_prefers_primary_key() {
    let ctx = context_with_job("j1", json!({"enhanced": "new", "plain": "old"}));
    let out = substitute("run {enhanced|plain}", &ctx, job_data(&ctx).as_ref(), "m");
    assert_eq!(out, "run new");
}

#[test]
fn fallback_uses_secondary_when_primary_missing() {
    let ctx = context_with_job("j1", json!({"plain": "old"}));
    let out = substitute("run {enhanced|plain}", &ctx, job_data(&ctx).as_ref(), "m");
    assert_eq!(out, "run old");
}

#[test]
fn fallback_left_literal_when_both_missing() {
    let ctx = context_with_job("j1", json!({}));
    let out = substitute("run {a|b}", &ctx, job_data(&ctx).as_ref(), "m");
    assert_eq!(out, "run {a|b}");
}

#[test]
fn paths_and_spaces_are_double_quoted() {
    let ctx = context_with_job("j1", json!({"input": "/tmp/in file.png", "n": 3}));
    let out = substitute("convert {input} {n}", &ctx, job_data(&ctx).as_ref(), "m");
    assert_eq!(out, "convert \"/tmp/in file.png\" 3");
}

#[test]
fn quoted_placeholders_escape_single_quotes() {
    let ctx = context_with_job("j1", json!({"prompt": "it's here"}));
    let out = substitute("say '{prompt}'", &ctx, job_data(&ctx).as_ref(), "m");
    assert_eq!(out, "say 'it'\\''s here'");
}

#[test]
fn event_payload_fills_gaps_without_overriding_job_data() {
    let mut ctx = context_with_job("j1", json!({"shared": "job"}));
    ctx.set(
        "event_data",
        json!({"payload": {"shared": "event", "extra": "payload_only"}}),
    );
    let data = job_data(&ctx);
    let out = substitute("{shared} {extra}", &ctx, data.as_ref(), "m");
    assert_eq!(out, "job payload_only");
}
