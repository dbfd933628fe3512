// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stale-queue hygiene: mark matching pending peer events processed
//! without dispatching them.

use crate::action::{Action, ActionEnv, ActionError};
use async_trait::async_trait;
use fsm_core::Context;
use serde::Deserialize;

/// Accepts a single event type or a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EventTypes {
    One(String),
    Many(Vec<String>),
}

impl Default for EventTypes {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl EventTypes {
    fn as_slice(&self) -> Vec<&str> {
        match self {
            Self::One(s) => vec![s.as_str()],
            Self::Many(v) => v.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ClearEventsAction {
    #[serde(default)]
    event_types: EventTypes,
    #[serde(default)]
    target_machine: Option<String>,
    #[serde(default)]
    success: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[async_trait]
impl Action for ClearEventsAction {
    async fn execute(&self, env: &ActionEnv, _ctx: &mut Context) -> Result<Option<String>, ActionError> {
        let machine = env.machine_name.as_str();
        let event_types = self.event_types.as_slice();
        let none_cleared = self
            .success
            .clone()
            .unwrap_or_else(|| "no_events_to_clear".to_string());

        if event_types.is_empty() {
            tracing::warn!(machine, "no event types specified for clearing");
            return Ok(Some(none_cleared));
        }
        let Some(target) = &self.target_machine else {
            tracing::warn!(machine, "no target machine specified for clearing events");
            return Ok(Some(none_cleared));
        };

        let result = (|| -> Result<usize, fsm_store::StoreError> {
            let events = env.db.machine_events().pending(target)?;
            let mut cleared = 0;
            for event in events {
                if event_types.contains(&event.event_type.as_str()) {
                    env.db.machine_events().mark_processed(event.id)?;
                    tracing::debug!(event_id = event.id, event = %event.event_type, "cleared pending event");
                    cleared += 1;
                }
            }
            Ok(cleared)
        })();

        match result {
            Ok(0) => {
                tracing::debug!(machine, ?event_types, "no pending events found");
                Ok(Some(none_cleared))
            }
            Ok(cleared) => {
                tracing::info!(machine, cleared, target = %target, ?event_types, "cleared pending events");
                Ok(Some(
                    self.success
                        .clone()
                        .unwrap_or_else(|| "events_cleared".to_string()),
                ))
            }
            Err(e) => {
                tracing::error!(machine, error = %e, "error clearing events");
                Ok(Some(
                    self.error.clone().unwrap_or_else(|| "error".to_string()),
                ))
            }
        }
    }
}

#[cfg(test)]
#[path = "clear_events_tests.rs"]
mod tests;
