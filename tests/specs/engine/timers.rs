//! Timed transitions: the shortest timer wins the race.

use crate::prelude::*;

#[test]
fn short_timeout_beats_long_timeout() {
    let ws = Workspace::new("timers");
    let config = ws.write_config(
        r#"
metadata:
  machine_name: timed
initial_state: idle
states: [idle, short, long, stopped]
transitions:
  - { from: idle, event: "timeout(0.5)", to: short }
  - { from: idle, event: "timeout(2)", to: long }
  - { from: short, event: "timeout(0.2)", to: stopped }
"#,
    );

    statemachine(&ws, &config).assert().success();

    // The run visited short, never long
    let events = ws.db().realtime_events().get_unconsumed(0, 100).unwrap();
    let visited: Vec<String> = events
        .iter()
        .filter(|e| e.event_type == "state_change")
        .filter_map(|e| e.payload["to_state"].as_str().map(String::from))
        .collect();
    assert!(visited.contains(&"short".to_string()), "visited: {visited:?}");
    assert!(!visited.contains(&"long".to_string()), "visited: {visited:?}");

    let state = ws.db().machine_states().get("timed").unwrap().unwrap();
    assert_eq!(state.current_state, "stopped");
}
