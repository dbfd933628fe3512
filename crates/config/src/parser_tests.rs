// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::Write;

const WORKER_YAML: &str = r#"
metadata:
  machine_name: worker_1
  description: demo worker
initial_state: waiting
states: [waiting, working, done, stopped]
events: [start, new_job, job_done, wake_up, stop]
transitions:
  - from: waiting
    event: start
    to: waiting
  - from: waiting
    event: new_job
    to: working
  - from: working
    event: job_done
    to: done
  - from: done
    event: wake_up
    to: waiting
  - from: "*"
    event: stop
    to: stopped
actions:
  waiting:
    - type: check_database_queue
      job_type: echo
  working:
    - type: bash
      command: "echo {payload}"
      timeout: 30
"#;

#[test]
fn parses_full_definition() {
    let config = parse_config(WORKER_YAML).unwrap();
    assert_eq!(config.machine_name(), Some("worker_1"));
    assert_eq!(config.initial_state, "waiting");
    assert_eq!(config.states.len(), 4);
    assert_eq!(config.transitions.len(), 5);
    assert_eq!(
        config.metadata.extra.get("description"),
        Some(&serde_json::json!("demo worker"))
    );

    let actions = config.actions_for("working");
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].action_type(), Some("bash"));
    assert_eq!(actions[0].get_str("command"), Some("echo {payload}"));
    assert_eq!(actions[0].get("timeout"), Some(&serde_json::json!(30)));
}

#[test]
fn load_config_reads_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(WORKER_YAML.as_bytes()).unwrap();
    let config = load_config(file.path()).unwrap();
    assert_eq!(config.initial_state, "waiting");
}

#[test]
fn missing_file_is_read_error() {
    let err = load_config("/nonexistent/machine.yaml").unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn invalid_yaml_is_yaml_error() {
    let err = parse_config("states: [unterminated").unwrap_err();
    assert!(matches!(err, ConfigError::Yaml(_)));
}

#[test]
fn minimal_definition_defaults_optional_sections() {
    let config = parse_config("initial_state: idle\nstates: [idle]\n").unwrap();
    assert!(config.machine_name().is_none());
    assert!(config.transitions.is_empty());
    assert!(config.actions_for("idle").is_empty());
    assert!(config.find_transition("idle", "start").is_none());
}

#[test]
fn timed_events_parse_in_transitions() {
    let config = parse_config(
        r#"
initial_state: idle
states: [idle, short, long]
transitions:
  - { from: idle, event: "timeout(0.5)", to: short }
  - { from: idle, event: "timeout(2)", to: long }
"#,
    )
    .unwrap();
    let timed = config.timed_transitions_from("idle");
    assert_eq!(timed.len(), 2);
    assert_eq!(timed[0].1, std::time::Duration::from_secs_f64(0.5));
    assert_eq!(timed[1].1, std::time::Duration::from_secs(2));
}
