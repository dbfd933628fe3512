// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Queue polling action: atomically claim the next job.

use crate::action::{Action, ActionEnv, ActionError};
use async_trait::async_trait;
use fsm_core::Context;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CheckDatabaseQueueAction {
    #[serde(default)]
    job_type: Option<String>,
    /// Machine tag filter. Absent means machine-agnostic: claim jobs
    /// regardless of their target machine (controller mode).
    #[serde(default)]
    machine_type: Option<String>,
    #[serde(default)]
    success: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[async_trait]
impl Action for CheckDatabaseQueueAction {
    async fn execute(&self, env: &ActionEnv, ctx: &mut Context) -> Result<Option<String>, ActionError> {
        let claimed = env
            .db
            .jobs()
            .get_next(self.job_type.as_deref(), self.machine_type.as_deref());

        match claimed {
            Ok(Some(job)) => {
                let data_keys: Vec<&String> = job
                    .data
                    .as_object()
                    .map(|m| m.keys().collect())
                    .unwrap_or_default();
                tracing::info!(
                    machine = %env.machine_name,
                    job_id = %job.job_id,
                    job_type = %job.job_type,
                    ?data_keys,
                    "job retrieved from queue"
                );
                ctx.set("current_job", job.to_current_job());
                Ok(Some(
                    self.success.clone().unwrap_or_else(|| "new_job".to_string()),
                ))
            }
            Ok(None) => Ok(Some("no_jobs".to_string())),
            Err(e) => {
                tracing::error!(machine = %env.machine_name, error = %e, "error checking database queue");
                Ok(Some(
                    self.error.clone().unwrap_or_else(|| "error".to_string()),
                ))
            }
        }
    }
}

#[cfg(test)]
#[path = "check_queue_tests.rs"]
mod tests;
