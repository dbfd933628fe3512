// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Machine definition types.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Wildcard `from` state matching any current state.
pub const WILDCARD: &str = "*";

/// Free-form metadata block. `machine_name` identifies the process in
/// socket and telemetry space; everything else rides along untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub machine_name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// One `(from, event, to)` rule. `from` may be [`WILDCARD`]; `event` may
/// be a timed form `timeout(<seconds>)`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Transition {
    pub from: String,
    pub event: String,
    pub to: String,
}

impl Transition {
    pub fn matches(&self, state: &str, event: &str) -> bool {
        (self.from == state || self.from == WILDCARD) && self.event == event
    }

    /// Duration for timed transitions, `None` for plain events.
    pub fn timeout(&self) -> Option<Duration> {
        fsm_core::parse_timeout(&self.event)
    }
}

/// Raw action configuration: an arbitrary YAML map with a `type` key.
/// Values are kept as a JSON tree so the engine can interpolate
/// placeholders recursively before constructing the action.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct ActionConfig(pub Value);

impl ActionConfig {
    pub fn action_type(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

/// A complete machine definition.
#[derive(Debug, Clone, Deserialize)]
pub struct FsmConfig {
    #[serde(default)]
    pub metadata: Metadata,
    pub initial_state: String,
    pub states: Vec<String>,
    /// Declared event names. Informational: transitions are the source of
    /// truth for dispatch.
    #[serde(default)]
    pub events: Vec<String>,
    #[serde(default)]
    pub transitions: Vec<Transition>,
    /// State → ordered action list, in document order.
    #[serde(default)]
    pub actions: IndexMap<String, Vec<ActionConfig>>,
}

impl FsmConfig {
    pub fn machine_name(&self) -> Option<&str> {
        self.metadata.machine_name.as_deref()
    }

    /// Actions configured for a state (empty when none).
    pub fn actions_for(&self, state: &str) -> &[ActionConfig] {
        self.actions.get(state).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First matching transition in document order, wildcard included.
    pub fn find_transition(&self, state: &str, event: &str) -> Option<&Transition> {
        self.transitions.iter().find(|t| t.matches(state, event))
    }

    /// Timed transitions leaving a state: `(event_name, duration)` pairs.
    /// Wildcard rules apply to every state, so a `from: "*"` timeout acts
    /// as a watchdog rearmed on each entry.
    pub fn timed_transitions_from(&self, state: &str) -> Vec<(&str, Duration)> {
        self.transitions
            .iter()
            .filter(|t| t.from == state || t.from == WILDCARD)
            .filter_map(|t| t.timeout().map(|d| (t.event.as_str(), d)))
            .collect()
    }

    pub fn has_state(&self, state: &str) -> bool {
        self.states.iter().any(|s| s == state)
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
