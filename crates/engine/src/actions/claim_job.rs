// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Targeted CAS claim on one job ID.
//!
//! Used by controllers spawning batches: claim atomically before
//! starting the worker so competing controllers cannot double-spawn.

use crate::action::{Action, ActionEnv, ActionError};
use async_trait::async_trait;
use fsm_core::Context;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ClaimJobAction {
    /// Job ID, already templated by the engine pass.
    job_id: String,
    #[serde(default)]
    success: Option<String>,
    #[serde(default)]
    already_claimed: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[async_trait]
impl Action for ClaimJobAction {
    async fn execute(&self, env: &ActionEnv, _ctx: &mut Context) -> Result<Option<String>, ActionError> {
        match env.db.jobs().claim(&self.job_id) {
            Ok(true) => {
                tracing::info!(machine = %env.machine_name, job_id = %self.job_id, "claimed job");
                Ok(Some(
                    self.success.clone().unwrap_or_else(|| "claimed".to_string()),
                ))
            }
            Ok(false) => {
                tracing::warn!(
                    machine = %env.machine_name,
                    job_id = %self.job_id,
                    "job already claimed or not found"
                );
                Ok(Some(
                    self.already_claimed
                        .clone()
                        .unwrap_or_else(|| "already_claimed".to_string()),
                ))
            }
            Err(e) => {
                tracing::error!(machine = %env.machine_name, error = %e, "error claiming job");
                Ok(Some(
                    self.error.clone().unwrap_or_else(|| "error".to_string()),
                ))
            }
        }
    }
}

#[cfg(test)]
#[path = "claim_job_tests.rs"]
mod tests;
