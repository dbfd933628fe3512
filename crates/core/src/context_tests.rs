// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

fn job_context() -> Context {
    let mut ctx = Context::new();
    ctx.set(
        "current_job",
        json!({
            "id": "job-1",
            "source_job_id": "parent-7",
            "job_type": "echo",
            "data": {
                "payload": "hello",
                "input_file_path": "/tmp/in.png",
                "skipped": null,
            }
        }),
    );
    ctx
}

#[test]
fn get_path_walks_nested_maps() {
    let ctx = job_context();
    assert_eq!(
        ctx.get_path("current_job.data.payload"),
        Some(&json!("hello"))
    );
}

#[test]
fn get_path_missing_and_null_are_none() {
    let ctx = job_context();
    assert_eq!(ctx.get_path("current_job.data.nope"), None);
    assert_eq!(ctx.get_path("current_job.data.skipped"), None);
    assert_eq!(ctx.get_path("current_job.id.deeper"), None);
}

#[test]
fn propagation_lifts_db_fields_and_data_keys() {
    let mut ctx = job_context();
    let keys = ctx.propagate_current_job().unwrap();

    assert_eq!(ctx.get("id"), Some(&json!("job-1")));
    assert_eq!(ctx.get("source_job_id"), Some(&json!("parent-7")));
    assert_eq!(ctx.get("job_type"), Some(&json!("echo")));
    assert_eq!(ctx.get("payload"), Some(&json!("hello")));
    assert_eq!(ctx.get("input_file_path"), Some(&json!("/tmp/in.png")));
    assert_eq!(keys.len(), 2);
}

#[test]
fn propagation_skips_null_values() {
    let mut ctx = job_context();
    ctx.propagate_current_job().unwrap();
    assert!(!ctx.contains("skipped"));
}

#[test]
fn propagation_overwrites_existing_keys() {
    let mut ctx = job_context();
    ctx.set("payload", "stale");
    ctx.propagate_current_job().unwrap();
    assert_eq!(ctx.get("payload"), Some(&json!("hello")));
}

#[test]
fn propagation_without_job_is_none() {
    let mut ctx = Context::new();
    ctx.set("other", 1);
    assert!(ctx.propagate_current_job().is_none());
}

#[test]
fn current_job_id_prefers_job_map() {
    let ctx = job_context();
    assert_eq!(ctx.current_job_id().as_deref(), Some("job-1"));

    let mut flat = Context::new();
    flat.set("id", "top-level");
    assert_eq!(flat.current_job_id().as_deref(), Some("top-level"));

    assert_eq!(Context::new().current_job_id(), None);
}

#[test]
fn render_keeps_strings_bare() {
    assert_eq!(render(&json!("abc")), "abc");
    assert_eq!(render(&json!(42)), "42");
    assert_eq!(render(&json!([1, 2])), "[1,2]");
}

#[test]
fn merge_overwrites() {
    let mut ctx = Context::new();
    ctx.set("a", 1);
    let other = match json!({"a": 2, "b": 3}) {
        serde_json::Value::Object(m) => m,
        _ => unreachable!(),
    };
    ctx.merge(other);
    assert_eq!(ctx.get("a"), Some(&json!(2)));
    assert_eq!(ctx.get("b"), Some(&json!(3)));
}
