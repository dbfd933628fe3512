// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wait for a batch of tracked jobs to reach terminal states.
//!
//! Returning `None` while jobs are pending leaves the engine in its
//! state, so a `timeout(N)` transition can pace the polling.

use crate::action::{Action, ActionEnv, ActionError};
use async_trait::async_trait;
use fsm_core::context::render;
use fsm_core::Context;
use fsm_store::JobStatus;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Deserialize)]
pub struct WaitForJobsAction {
    #[serde(default = "default_tracked_key")]
    tracked_jobs_key: String,
    /// Maximum total wait in seconds.
    #[serde(default = "default_timeout")]
    timeout: f64,
    #[serde(default)]
    success: Option<String>,
    /// Event while jobs are still processing; omit to stay in state.
    #[serde(default)]
    pending: Option<String>,
    #[serde(default)]
    timeout_event: Option<String>,
}

fn default_tracked_key() -> String {
    "spawned_jobs".to_string()
}

fn default_timeout() -> f64 {
    300.0
}

#[async_trait]
impl Action for WaitForJobsAction {
    async fn execute(&self, env: &ActionEnv, ctx: &mut Context) -> Result<Option<String>, ActionError> {
        let machine = env.machine_name.as_str();

        let job_ids: Vec<String> = match ctx.get(&self.tracked_jobs_key) {
            Some(Value::Array(ids)) => ids.iter().map(render).collect(),
            _ => Vec::new(),
        };
        if job_ids.is_empty() {
            tracing::warn!(machine, key = %self.tracked_jobs_key, "no jobs tracked in context");
            return Ok(Some("no_jobs_tracked".to_string()));
        }

        let now = epoch_secs();
        let started = match ctx.get("wait_start_time").and_then(Value::as_f64) {
            Some(started) => started,
            None => {
                ctx.set("wait_start_time", now);
                tracing::info!(machine, count = job_ids.len(), ?job_ids, "waiting for jobs");
                now
            }
        };

        let elapsed = now - started;
        if elapsed > self.timeout {
            tracing::warn!(machine, elapsed, "timeout reached waiting for jobs");
            if let Some(timeout_event) = &self.timeout_event {
                return Ok(Some(timeout_event.clone()));
            }
            // No timeout event configured: fall through and report status
        }

        let statuses = env.db.jobs().statuses(&job_ids)?;

        let mut completed = Vec::new();
        let mut failed = Vec::new();
        let mut pending = Vec::new();
        for job_id in &job_ids {
            match statuses.get(job_id) {
                Some(JobStatus::Completed) => completed.push(job_id.clone()),
                Some(JobStatus::Failed) => failed.push(job_id.clone()),
                Some(_) => pending.push(job_id.clone()),
                None => {
                    tracing::warn!(machine, job_id = %job_id, "job not found in database");
                    pending.push(job_id.clone());
                }
            }
        }

        tracing::info!(
            machine,
            completed = completed.len(),
            failed = failed.len(),
            pending = pending.len(),
            elapsed,
            "job status check"
        );

        let all_done = pending.is_empty();
        ctx.set("completed_jobs", json!(completed));
        ctx.set("failed_jobs", json!(failed));
        ctx.set("pending_jobs", json!(pending));

        if all_done {
            ctx.remove("wait_start_time");
            tracing::info!(
                machine,
                completed = completed.len(),
                failed = failed.len(),
                "all jobs complete"
            );
            return Ok(Some(
                self.success
                    .clone()
                    .unwrap_or_else(|| "all_jobs_complete".to_string()),
            ));
        }

        // Pending: either route an event or stay put and let a timed
        // transition pace the poll
        Ok(self.pending.clone())
    }
}

fn epoch_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

#[cfg(test)]
#[path = "wait_for_jobs_tests.rs"]
mod tests;
