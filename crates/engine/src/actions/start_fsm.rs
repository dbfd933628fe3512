// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spawn a child engine process.
//!
//! The child is detached into its own process group and never reaped by
//! the parent: OS lifecycle and job lifecycle are deliberately split,
//! and parents that want completion signals use wait_for_jobs against
//! the store. Selected context variables are serialized onto the child's
//! command line as `--initial-context` JSON.

use crate::action::{Action, ActionEnv, ActionError};
use async_trait::async_trait;
use fsm_core::{Context, Map};
use serde::Deserialize;
use serde_json::{json, Value};
use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};

/// Contexts bigger than this still spawn, but get flagged: they ride on
/// the command line.
const CONTEXT_WARN_BYTES: usize = 4096;

#[derive(Debug, Deserialize)]
pub struct StartFsmAction {
    yaml_path: String,
    machine_name: String,
    /// Variables to pass along. Three syntaxes: `name` (copy), a dotted
    /// path (extract nested), `source as target` (extract and rename).
    #[serde(default)]
    context_vars: Vec<String>,
    #[serde(default)]
    additional_args: Vec<String>,
    #[serde(default)]
    store_pid: bool,
    #[serde(default)]
    success: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[async_trait]
impl Action for StartFsmAction {
    async fn execute(&self, env: &ActionEnv, ctx: &mut Context) -> Result<Option<String>, ActionError> {
        let machine = env.machine_name.as_str();
        let error_event = self.error.clone().unwrap_or_else(|| "error".to_string());

        if self.yaml_path.is_empty() || self.machine_name.is_empty() {
            tracing::error!(machine, "start_fsm requires yaml_path and machine_name");
            return Ok(Some(error_event));
        }

        let mut command = Command::new("statemachine");
        command
            .arg(&self.yaml_path)
            .arg("--machine-name")
            .arg(&self.machine_name)
            // Children join the parent's store and socket namespace
            .arg("--db-path")
            .arg(env.db.path())
            .arg("--socket-prefix")
            .arg(env.namespace.prefix());

        if !self.context_vars.is_empty() {
            let extracted = self.extract_context_vars(ctx, machine);
            if !extracted.is_empty() {
                let context_json = Value::Object(extracted).to_string();
                if context_json.len() > CONTEXT_WARN_BYTES {
                    tracing::warn!(
                        machine,
                        bytes = context_json.len(),
                        "initial context JSON is large"
                    );
                }
                command.arg("--initial-context").arg(context_json);
            }
        }

        command.args(&self.additional_args);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        // Detach: new process group, not reaped by this engine
        command.process_group(0);

        tracing::info!(
            machine,
            child = %self.machine_name,
            yaml = %self.yaml_path,
            "spawning child state machine"
        );

        match command.spawn() {
            Ok(child) => {
                let pid = child.id();
                tracing::info!(machine, child = %self.machine_name, pid, "spawned child");
                if self.store_pid {
                    let mut pids = match ctx.get("spawned_pids") {
                        Some(Value::Array(pids)) => pids.clone(),
                        _ => Vec::new(),
                    };
                    pids.push(json!(pid));
                    ctx.set("spawned_pids", pids);
                }
                Ok(Some(
                    self.success.clone().unwrap_or_else(|| "success".to_string()),
                ))
            }
            Err(e) => {
                tracing::error!(machine, error = %e, "failed to spawn child state machine");
                Ok(Some(error_event))
            }
        }
    }
}

impl StartFsmAction {
    fn extract_context_vars(&self, ctx: &Context, machine: &str) -> Map {
        let mut extracted = Map::new();
        for spec in &self.context_vars {
            let (source, target) = match spec.split_once(" as ") {
                Some((source, target)) => (source.trim(), target.trim()),
                None => (spec.trim(), spec.trim()),
            };
            match ctx.get_path(source) {
                Some(value) => {
                    extracted.insert(target.to_string(), value.clone());
                }
                None => {
                    tracing::warn!(machine, var = source, "context variable not found, skipping");
                }
            }
        }
        extracted
    }
}

#[cfg(test)]
#[path = "start_fsm_tests.rs"]
mod tests;
