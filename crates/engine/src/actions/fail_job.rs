// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mark a job failed.

use crate::action::{Action, ActionEnv, ActionError};
use async_trait::async_trait;
use fsm_core::{interpolate_str, Context};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct FailJobAction {
    #[serde(default = "default_job_id")]
    job_id: String,
    /// Failure message template. Defaults to the context's `last_error`.
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    success: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

fn default_job_id() -> String {
    "{job_id}".to_string()
}

#[async_trait]
impl Action for FailJobAction {
    async fn execute(&self, env: &ActionEnv, ctx: &mut Context) -> Result<Option<String>, ActionError> {
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

        let message = self
            .error_message
            .clone()
            .or_else(|| ctx.get_str("last_error").map(String::from))
            .unwrap_or_else(|| "Unknown error".to_string());

        match env.db.jobs().fail(&job_id, &message) {
            Ok(()) => {
                tracing::info!(machine = %env.machine_name, job_id = %job_id, "job marked as failed");
                Ok(Some(
                    self.success.clone().unwrap_or_else(|| "success".to_string()),
                ))
            }
            Err(e) => {
                tracing::error!(machine = %env.machine_name, error = %e, "error failing job");
                Ok(Some(
                    self.error.clone().unwrap_or_else(|| "error".to_string()),
                ))
            }
        }
    }
}

#[cfg(test)]
#[path = "fail_job_tests.rs"]
mod tests;
