// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for engine and action tests.

use crate::action::ActionEnv;
use crate::sockets::Telemetry;
use fsm_core::{Context, Map, SocketNamespace};
use fsm_store::Database;
use serde_json::Value;

pub(crate) const TEST_MACHINE: &str = "test_machine";

/// A scratch database + socket namespace rooted in a tempdir. The
/// tempdir must stay alive for the duration of the test.
pub(crate) struct TestEnv {
    #[allow(dead_code)]
    pub dir: tempfile::TempDir,
    pub env: ActionEnv,
}

pub(crate) fn action_env() -> TestEnv {
    action_env_named(TEST_MACHINE)
}

pub(crate) fn action_env_named(machine_name: &str) -> TestEnv {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("pipeline.db")).unwrap();
    let namespace = SocketNamespace::new("t").with_dir(dir.path());
    let telemetry = Telemetry::new(machine_name, &namespace, db.clone());
    TestEnv {
        env: ActionEnv {
            db,
            machine_name: machine_name.to_string(),
            namespace,
            telemetry,
        },
        dir,
    }
}

/// Build a config map for action construction from a JSON literal.
pub(crate) fn config(value: Value) -> Map {
    match value {
        Value::Object(map) => map,
        _ => panic!("action config fixture must be an object"),
    }
}

/// Context pre-populated with a current job, mirroring what
/// check_database_queue leaves behind.
pub(crate) fn context_with_job(job_id: &str, data: Value) -> Context {
    let mut ctx = Context::new();
    ctx.set("machine_name", TEST_MACHINE);
    ctx.set(
        "current_job",
        serde_json::json!({
            "id": job_id,
            "source_job_id": null,
            "job_type": "echo",
            "data": data,
        }),
    );
    ctx.propagate_current_job();
    ctx
}
