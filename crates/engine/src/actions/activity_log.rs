// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! UI activity log action.
//!
//! Writes a structured record to the realtime-events stream so it shows
//! up in observer UIs. Reached via the `activity_log` alias (the literal
//! `log` tag is the engine-intrinsic logger).

use crate::action::{Action, ActionEnv, ActionError};
use async_trait::async_trait;
use fsm_core::Context;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct ActivityLogAction {
    #[serde(default = "default_message")]
    message: String,
    /// One of info, success, error.
    #[serde(default = "default_level")]
    level: String,
    #[serde(default)]
    success: Option<String>,
}

fn default_message() -> String {
    "Log message".to_string()
}

fn default_level() -> String {
    "info".to_string()
}

#[async_trait]
impl Action for ActivityLogAction {
    async fn execute(&self, env: &ActionEnv, _ctx: &mut Context) -> Result<Option<String>, ActionError> {
        let payload = json!({
            "message": self.message,
            "level": self.level,
            "machine": env.machine_name,
        });
        env.telemetry.emit("activity_log", payload);

        match self.level.as_str() {
            "error" => tracing::error!(machine = %env.machine_name, "activity log: {}", self.message),
            _ => tracing::info!(machine = %env.machine_name, "activity log: {}", self.message),
        }

        Ok(Some(
            self.success.clone().unwrap_or_else(|| "success".to_string()),
        ))
    }
}

#[cfg(test)]
#[path = "activity_log_tests.rs"]
mod tests;
