// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Peer event action.
//!
//! Fast path: a datagram straight to the target machine's control
//! socket. Slow path (socket missing or send failed): a machine_events
//! row plus a `wake_up` datagram so the peer notices promptly. The slow
//! path is what makes delivery at-least-once; the fast path is
//! fire-and-forget.

use crate::action::{Action, ActionEnv, ActionError};
use crate::sockets::send_datagram;
use async_trait::async_trait;
use fsm_core::{Context, Map};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct SendEventAction {
    target_machine: String,
    #[serde(default = "default_event_type")]
    event_type: String,
    /// Either a map (each value templated by the engine pass, including
    /// nested `{event_data.payload.x.y}` extraction) or the single
    /// template string `{event_data.payload}` to forward the whole
    /// incoming payload — which the engine pass resolves to a map when
    /// present.
    #[serde(default)]
    payload: Option<Value>,
    #[serde(default)]
    success: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    job_id: Option<String>,
}

fn default_event_type() -> String {
    "generic_event".to_string()
}

#[async_trait]
impl Action for SendEventAction {
    async fn execute(&self, env: &ActionEnv, ctx: &mut Context) -> Result<Option<String>, ActionError> {
        let machine = env.machine_name.as_str();
        let job_id = self
            .job_id
            .clone()
            .or_else(|| ctx.current_job_id());
        let payload = self.resolve_payload(machine);

        let message = json!({
            "type": self.event_type,
            "payload": payload,
            "job_id": job_id,
        });

        let control_path = env.namespace.control_path(&self.target_machine);
        let sent = control_path.exists() && send_datagram(&control_path, &message).is_ok();

        if sent {
            tracing::info!(
                machine,
                event = %self.event_type,
                target = %self.target_machine,
                "sent event via socket"
            );
        } else {
            // Durable fallback, then a nudge so the peer polls soon
            let payload_text = match &payload {
                Value::Object(map) if map.is_empty() => None,
                other => Some(other.to_string()),
            };
            let stored = env.db.machine_events().send(
                &self.target_machine,
                &self.event_type,
                Some(machine),
                job_id.as_deref(),
                payload_text.as_deref(),
            );
            match stored {
                Ok(event_id) => {
                    let wake = json!({"type": fsm_core::event::WAKE_UP});
                    if send_datagram(&control_path, &wake).is_ok() {
                        tracing::debug!(machine, target = %self.target_machine, "sent wake_up");
                    }
                    tracing::info!(
                        machine,
                        event = %self.event_type,
                        target = %self.target_machine,
                        event_id,
                        "sent event via database"
                    );
                }
                Err(e) => {
                    tracing::error!(machine, error = %e, "error sending event");
                    return Ok(Some(
                        self.error.clone().unwrap_or_else(|| "error".to_string()),
                    ));
                }
            }
        }

        if let Some(job_id) = &job_id {
            tracing::debug!(machine, job_id = %job_id, "event relates to job");
        }

        Ok(Some(
            self.success
                .clone()
                .unwrap_or_else(|| "event_sent".to_string()),
        ))
    }
}

impl SendEventAction {
    /// The engine's interpolation pass has already resolved map values
    /// and whole-payload forwards; what's left here is normalizing the
    /// unresolved cases to an empty map.
    fn resolve_payload(&self, machine: &str) -> Value {
        match &self.payload {
            None => Value::Object(Map::new()),
            Some(Value::Object(map)) => Value::Object(map.clone()),
            Some(Value::String(s)) => {
                // A surviving template string means the source path was
                // absent from context
                tracing::warn!(
                    machine,
                    template = %s,
                    "payload template did not resolve to a map, sending empty payload"
                );
                Value::Object(Map::new())
            }
            Some(other) => other.clone(),
        }
    }
}

#[cfg(test)]
#[path = "send_event_tests.rs"]
mod tests;
