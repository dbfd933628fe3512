// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shell command action.
//!
//! The command comes from `current_job.data.command` or the action
//! config. Config commands get a second substitution pass on top of the
//! engine's: `{primary|fallback}` expressions, shell quoting for values
//! with slashes or whitespace, and single-quote escaping inside `'{…}'`.
//! Exit codes route through `error_mappings`; a mapped failure keeps
//! `current_job` so the FSM can handle it as recoverable.

use crate::action::{Action, ActionEnv, ActionError};
use crate::subprocess::{run_shell, ShellOutcome};
use async_trait::async_trait;
use fsm_core::context::render;
use fsm_core::{Context, Map, RateCounter};
use parking_lot::Mutex;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::LazyLock;
use std::time::Duration;

// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static FALLBACK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([^|}]+)\|([^}]+)\}").expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static LEFTOVER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^}]+\}").expect("constant regex pattern is valid"));

/// Per-process command frequency counter; hot loops re-running the same
/// command are surfaced once and then every 100th time.
static COMMAND_COUNTS: LazyLock<Mutex<RateCounter>> =
    LazyLock::new(|| Mutex::new(RateCounter::new()));

#[derive(Debug, Deserialize)]
pub struct BashAction {
    #[serde(default)]
    command: Option<String>,
    /// Seconds before the process group is killed.
    #[serde(default = "default_timeout")]
    timeout: f64,
    #[serde(default)]
    success: Option<String>,
    #[serde(default)]
    error: Option<String>,
    /// Exit code (as string) → event name. Mapped failures are
    /// recoverable: `current_job` stays in context.
    #[serde(default)]
    error_mappings: HashMap<String, String>,
    #[serde(default)]
    description: Option<String>,
}

fn default_timeout() -> f64 {
    30.0
}

#[async_trait]
impl Action for BashAction {
    async fn execute(&self, env: &ActionEnv, ctx: &mut Context) -> Result<Option<String>, ActionError> {
        let machine = env.machine_name.as_str();
        let job_data = job_data(ctx);

        // Job-supplied command wins over the configured template
        let mut command = job_data
            .as_ref()
            .and_then(|data| data.get("command"))
            .and_then(Value::as_str)
            .map(String::from);

        if command.is_none() {
            command = self
                .command
                .as_ref()
                .map(|template| substitute(template, ctx, job_data.as_ref(), machine));
        }

        let Some(command) = command else {
            tracing::error!(machine, "no command specified in job data or bash action config");
            return Ok(Some(self.error_event()));
        };

        let job_id = ctx.current_job_id().unwrap_or_else(|| "unknown".to_string());
        if let Some(description) = &self.description {
            tracing::info!(machine, "{}", truncate(description, 60));
        }

        let key = truncate(&command, 50).to_string();
        if !command.starts_with("mkdir -p") {
            let count = COMMAND_COUNTS.lock().tick(&key);
            if count == 1 {
                tracing::info!(machine, command = %command, "first execution");
            } else if count % 100 == 0 {
                tracing::warn!(machine, count, command = %command, "command executed repeatedly");
            }
            tracing::debug!(machine, job_id = %job_id, command = %command, "executing command");
        }

        match run_shell(&command, Duration::from_secs_f64(self.timeout.max(0.0))).await {
            Ok(ShellOutcome::Exited {
                code,
                stdout,
                stderr,
            }) => {
                let stdout = stdout.trim();
                let stderr = stderr.trim();
                if !stdout.is_empty() {
                    tracing::debug!(machine, output = truncate(stdout, 200), "command output");
                }
                if !stderr.is_empty() {
                    tracing::warn!(machine, output = truncate(stderr, 200), "command error output");
                }

                let code = code.unwrap_or(-1);
                if code == 0 {
                    tracing::debug!(machine, command = %truncate(&command, 50), "command completed");
                    return Ok(Some(
                        self.success.clone().unwrap_or_else(|| "job_done".to_string()),
                    ));
                }

                let error_output = if stderr.is_empty() {
                    "No error output"
                } else {
                    stderr
                };
                tracing::error!(machine, job_id = %job_id, code, command = %command, "command failed");
                ctx.set(
                    "last_error",
                    format!("Command failed (exit {code}): {error_output}\nCommand: {command}"),
                );
                ctx.set("last_error_action", "bash");
                ctx.set("last_error_command", command.clone());
                ctx.set("last_error_exit_code", code);

                if let Some(mapped) = self.error_mappings.get(&code.to_string()) {
                    // Recoverable by FSM design: keep the job in context
                    tracing::info!(machine, code, event = %mapped, "mapping exit code to event");
                    return Ok(Some(mapped.clone()));
                }

                ctx.remove("current_job");
                Ok(Some(self.error_event()))
            }
            Ok(ShellOutcome::TimedOut) => {
                let message = format!(
                    "Command timed out after {} seconds\nCommand: {command}",
                    self.timeout
                );
                tracing::error!(machine, job_id = %job_id, command = %command, "{message}");
                ctx.set("last_error", message);
                ctx.set("last_error_action", "bash");
                ctx.set("last_error_command", command);
                ctx.remove("last_error_exit_code");
                ctx.remove("current_job");
                Ok(Some(self.error_event()))
            }
            Err(e) => {
                let message = format!("Command execution exception: {e}\nCommand: {command}");
                tracing::error!(machine, job_id = %job_id, "{message}");
                ctx.set("last_error", message);
                ctx.set("last_error_action", "bash");
                ctx.set("last_error_command", command);
                ctx.remove("current_job");
                Ok(Some(self.error_event()))
            }
        }
    }
}

impl BashAction {
    fn error_event(&self) -> String {
        self.error.clone().unwrap_or_else(|| "error".to_string())
    }
}

fn job_data(ctx: &Context) -> Option<Map> {
    ctx.current_job()?
        .get("data")
        .and_then(Value::as_object)
        .cloned()
}

/// Merged substitution source: the full propagated context, overlaid by
/// job data, overlaid by incoming event payload keys the job does not
/// define.
fn substitution_source(ctx: &Context, job_data: Option<&Map>) -> Map {
    let mut merged = ctx.values().clone();
    if let Some(data) = job_data {
        for (k, v) in data {
            merged.insert(k.clone(), v.clone());
        }
    }
    if let Some(payload) = ctx.get_path("event_data.payload").and_then(Value::as_object) {
        for (k, v) in payload {
            let shadowed = job_data.map(|d| d.contains_key(k)).unwrap_or(false);
            if !shadowed && !merged.contains_key(k) {
                merged.insert(k.clone(), v.clone());
            }
        }
    }
    merged
}

/// Bash-specific substitution pass, applied after the engine's generic
/// one: fallback expressions first, then any placeholders the engine
/// could not resolve, with shell-aware quoting.
fn substitute(template: &str, ctx: &Context, job_data: Option<&Map>, machine: &str) -> String {
    let source = substitution_source(ctx, job_data);
    let mut command = template.to_string();

    // {primary|fallback} — first present key wins
    let pairs: Vec<(String, String)> = FALLBACK
        .captures_iter(&command)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect();
    for (primary, fallback) in pairs {
        let value = source.get(&primary).or_else(|| source.get(&fallback));
        let Some(value) = value.filter(|v| !v.is_null()) else {
            continue;
        };
        let placeholder = format!("{{{primary}|{fallback}}}");
        command = replace_placeholder(&command, &placeholder, value);
    }

    for (key, value) in &source {
        if key == "event" || value.is_null() {
            continue;
        }
        let placeholder = format!("{{{key}}}");
        command = replace_placeholder(&command, &placeholder, value);
    }

    let leftover: Vec<&str> = LEFTOVER.find_iter(&command).map(|m| m.as_str()).collect();
    if !leftover.is_empty() {
        tracing::warn!(machine, ?leftover, "unsubstituted placeholders found");
    }

    command
}

/// Replace both the `'{key}'` and `{key}` forms of one placeholder.
/// Quoted occurrences get single-quote escaping; unquoted string values
/// containing `/` or whitespace are double-quoted.
fn replace_placeholder(command: &str, placeholder: &str, value: &Value) -> String {
    let mut command = command.to_string();
    let rendered = render(value);

    let quoted_placeholder = format!("'{placeholder}'");
    if command.contains(&quoted_placeholder) {
        let escaped = rendered.replace('\'', "'\\''");
        command = command.replace(&quoted_placeholder, &format!("'{escaped}'"));
    }

    if command.contains(placeholder) {
        let replacement = match value {
            Value::String(s) if s.contains('/') || s.contains(' ') => format!("\"{s}\""),
            _ => rendered,
        };
        command = command.replace(placeholder, &replacement);
    }

    command
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        s
    } else {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        &s[..end]
    }
}

#[cfg(test)]
#[path = "bash_tests.rs"]
mod tests;
