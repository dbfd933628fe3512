//! Startup and shutdown behaviour.

use crate::prelude::*;

#[test]
fn clean_stop_exits_zero() {
    let ws = Workspace::new("stop");
    let config = ws.write_config(
        r#"
metadata:
  machine_name: stopper
initial_state: waiting
states: [waiting, stopped]
transitions:
  - { from: waiting, event: start, to: stopped }
"#,
    );

    statemachine(&ws, &config).assert().success();

    // The engine registered itself and its terminal state
    let state = ws.db().machine_states().get("stopper").unwrap().unwrap();
    assert_eq!(state.current_state, "stopped");
}

#[test]
fn missing_config_exits_one() {
    let ws = Workspace::new("missing");
    let mut cmd = statemachine(&ws, std::path::Path::new("/nonexistent/machine.yaml"));
    cmd.assert().failure();
}

#[test]
fn invalid_yaml_exits_one() {
    let ws = Workspace::new("badyaml");
    let config = ws.write_config("states: [unterminated");
    statemachine(&ws, &config).assert().failure();
}

#[test]
fn undeclared_state_exits_one() {
    let ws = Workspace::new("badstate");
    let config = ws.write_config(
        r#"
initial_state: waiting
states: [waiting]
transitions:
  - { from: waiting, event: go, to: ghost }
"#,
    );
    statemachine(&ws, &config).assert().failure();
}

#[test]
fn machine_name_flag_overrides_metadata() {
    let ws = Workspace::new("rename");
    let config = ws.write_config(
        r#"
metadata:
  machine_name: from_config
initial_state: waiting
states: [waiting, stopped]
transitions:
  - { from: waiting, event: start, to: stopped }
"#,
    );

    statemachine(&ws, &config)
        .arg("--machine-name")
        .arg("from_flag")
        .assert()
        .success();

    assert!(ws.db().machine_states().get("from_flag").unwrap().is_some());
    assert!(ws.db().machine_states().get("from_config").unwrap().is_none());
}

#[test]
fn initial_context_seeds_the_run() {
    let ws = Workspace::new("seedctx");
    // The seeded variable routes the run: bash echoes it and a mapped
    // exit would fail, so success proves the template resolved
    let config = ws.write_config(
        r#"
metadata:
  machine_name: seeded
initial_state: working
states: [working, stopped]
transitions:
  - { from: working, event: job_done, to: stopped }
actions:
  working:
    - { type: bash, command: "test {expected} = 42" }
"#,
    );

    statemachine(&ws, &config)
        .arg("--initial-context")
        .arg("{\"expected\": 42}")
        .assert()
        .success();
}
