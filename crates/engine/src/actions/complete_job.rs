// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mark a job completed.

use crate::action::{Action, ActionEnv, ActionError};
use async_trait::async_trait;
use fsm_core::{interpolate_str, Context};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct CompleteJobAction {
    #[serde(default = "default_job_id")]
    job_id: String,
    #[serde(default)]
    success: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

fn default_job_id() -> String {
    "{job_id}".to_string()
}

#[async_trait]
impl Action for CompleteJobAction {
    async fn execute(&self, env: &ActionEnv, ctx: &mut Context) -> Result<Option<String>, ActionError> {
        // The default template is applied at construction, after the
        // engine's pass, so resolve it here
        let job_id = match interpolate_str(&self.job_id, ctx) {
            Value::String(s) => s,
            other => fsm_core::context::render(&other),
        };
        if job_id.is_empty() || job_id.contains('{') {
            tracing::error!(
                machine = %env.machine_name,
                job_id = %job_id,
                "job_id is required or contains unresolved variables"
            );
            return Ok(Some(
                self.error.clone().unwrap_or_else(|| "error".to_string()),
            ));
        }

        match env.db.jobs().complete(&job_id) {
            Ok(()) => {
                tracing::info!(machine = %env.machine_name, job_id = %job_id, "job marked as completed");
                Ok(Some(
                    self.success.clone().unwrap_or_else(|| "success".to_string()),
                ))
            }
            Err(e) => {
                tracing::error!(machine = %env.machine_name, error = %e, "error completing job");
                Ok(Some(
                    self.error.clone().unwrap_or_else(|| "error".to_string()),
                ))
            }
        }
    }
}

#[cfg(test)]
#[path = "complete_job_tests.rs"]
mod tests;
