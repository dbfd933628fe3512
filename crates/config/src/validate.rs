// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structural validation of machine definitions.

use crate::parser::ConfigError;
use crate::types::{FsmConfig, WILDCARD};
use std::collections::HashSet;

/// Validate a parsed definition.
///
/// Fatal: unknown initial state, transitions naming undeclared states,
/// malformed `timeout(...)` events, actions without a `type`.
/// Warn-only: duplicate `(from, event)` pairs — the engine uses the first
/// match in document order, and existing configs rely on that.
pub fn validate(config: &FsmConfig) -> Result<(), ConfigError> {
    if !config.has_state(&config.initial_state) {
        return Err(ConfigError::UnknownInitialState(
            config.initial_state.clone(),
        ));
    }

    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    for t in &config.transitions {
        let context = format!("{} --{}--> {}", t.from, t.event, t.to);
        if t.from != WILDCARD && !config.has_state(&t.from) {
            return Err(ConfigError::UndeclaredState {
                state: t.from.clone(),
                context,
            });
        }
        if !config.has_state(&t.to) {
            return Err(ConfigError::UndeclaredState {
                state: t.to.clone(),
                context,
            });
        }
        if t.event.starts_with("timeout(") && t.timeout().is_none() {
            return Err(ConfigError::InvalidTimeout(t.event.clone()));
        }
        if !seen.insert((t.from.as_str(), t.event.as_str())) {
            tracing::warn!(
                from = %t.from,
                event = %t.event,
                "duplicate transition; first match in document order wins"
            );
        }
    }

    for (state, actions) in &config.actions {
        for (index, action) in actions.iter().enumerate() {
            if action.action_type().is_none() {
                return Err(ConfigError::MissingActionType {
                    state: state.clone(),
                    index,
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
