// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Batch queue read without claiming.
//!
//! Controllers use this to plan a batch, then claim each job
//! individually (claim_job) as workers spawn.

use crate::action::{Action, ActionEnv, ActionError};
use async_trait::async_trait;
use fsm_core::Context;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct GetPendingJobsAction {
    #[serde(default)]
    job_type: Option<String>,
    #[serde(default)]
    machine_type: Option<String>,
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default = "default_store_as")]
    store_as: String,
    #[serde(default)]
    success: Option<String>,
    #[serde(default)]
    empty: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

fn default_store_as() -> String {
    "pending_jobs".to_string()
}

#[async_trait]
impl Action for GetPendingJobsAction {
    async fn execute(&self, env: &ActionEnv, ctx: &mut Context) -> Result<Option<String>, ActionError> {
        let jobs = env.db.jobs().get_pending(
            self.job_type.as_deref(),
            self.machine_type.as_deref(),
            self.limit,
        );

        match jobs {
            Ok(jobs) if !jobs.is_empty() => {
                tracing::info!(
                    machine = %env.machine_name,
                    count = jobs.len(),
                    "retrieved pending jobs"
                );
                let entries: Vec<Value> = jobs.iter().map(|j| j.to_context_entry()).collect();
                ctx.set(self.store_as.clone(), entries);
                Ok(Some(
                    self.success
                        .clone()
                        .unwrap_or_else(|| "jobs_found".to_string()),
                ))
            }
            Ok(_) => {
                tracing::info!(machine = %env.machine_name, "no pending jobs found");
                ctx.set(self.store_as.clone(), Vec::<Value>::new());
                Ok(Some(
                    self.empty.clone().unwrap_or_else(|| "no_jobs".to_string()),
                ))
            }
            Err(e) => {
                tracing::error!(machine = %env.machine_name, error = %e, "error getting pending jobs");
                ctx.set(self.store_as.clone(), Vec::<Value>::new());
                Ok(Some(
                    self.error.clone().unwrap_or_else(|| "error".to_string()),
                ))
            }
        }
    }
}

#[cfg(test)]
#[path = "get_pending_tests.rs"]
mod tests;
