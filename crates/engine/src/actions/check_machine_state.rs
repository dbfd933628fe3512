// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Peer state validation via the transition log.
//!
//! Reads the latest state-change row for a named peer instead of opening
//! sockets; stale or missing rows mean the peer is not running.

use crate::action::{Action, ActionEnv, ActionError};
use async_trait::async_trait;
use chrono::Utc;
use fsm_core::Context;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CheckMachineStateAction {
    target_machine: String,
    #[serde(default)]
    expected_states: Vec<String>,
    /// Freshness threshold: state rows older than this count as down.
    #[serde(default = "default_timeout_seconds")]
    timeout_seconds: i64,
    #[serde(default)]
    error: Option<String>,
}

fn default_timeout_seconds() -> i64 {
    60
}

#[async_trait]
impl Action for CheckMachineStateAction {
    async fn execute(&self, env: &ActionEnv, ctx: &mut Context) -> Result<Option<String>, ActionError> {
        let machine = env.machine_name.as_str();

        let latest = match env.db.pipeline_results().latest_state_change(&self.target_machine) {
            Ok(latest) => latest,
            Err(e) => {
                tracing::error!(machine, error = %e, "error checking machine state");
                return Ok(Some(
                    self.error.clone().unwrap_or_else(|| "error".to_string()),
                ));
            }
        };

        let Some(change) = latest else {
            tracing::warn!(machine, target = %self.target_machine, "no state data for machine");
            return Ok(Some("not_running".to_string()));
        };

        let age_secs = change
            .completed_at
            .map(|at| (Utc::now() - at).num_seconds())
            .unwrap_or(i64::MAX);
        if age_secs > self.timeout_seconds {
            tracing::warn!(
                machine,
                target = %self.target_machine,
                age_secs,
                limit = self.timeout_seconds,
                "state data is stale"
            );
            return Ok(Some("not_running".to_string()));
        }

        if self.expected_states.contains(&change.state) {
            tracing::info!(
                machine,
                target = %self.target_machine,
                state = %change.state,
                "machine in expected state"
            );
            Ok(Some("in_expected_state".to_string()))
        } else {
            tracing::info!(
                machine,
                target = %self.target_machine,
                state = %change.state,
                expected = ?self.expected_states,
                "machine in unexpected state"
            );
            ctx.set("unexpected_machine_state", change.state);
            Ok(Some("unexpected_state".to_string()))
        }
    }
}

#[cfg(test)]
#[path = "check_machine_state_tests.rs"]
mod tests;
