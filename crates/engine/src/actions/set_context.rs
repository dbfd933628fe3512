// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Set one context key to a literal (or templated) value.
//!
//! The usual way to reset tracking lists, flags, and counters between
//! batches.

use crate::action::{Action, ActionEnv, ActionError};
use async_trait::async_trait;
use fsm_core::Context;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct SetContextAction {
    key: String,
    value: Value,
    #[serde(default)]
    success: Option<String>,
}

#[async_trait]
impl Action for SetContextAction {
    async fn execute(&self, env: &ActionEnv, ctx: &mut Context) -> Result<Option<String>, ActionError> {
        let old = ctx.get(&self.key).cloned();
        ctx.set(self.key.clone(), self.value.clone());
        tracing::info!(
            machine = %env.machine_name,
            key = %self.key,
            value = ?self.value,
            old = ?old,
            "set context value"
        );
        Ok(Some(
            self.success.clone().unwrap_or_else(|| "success".to_string()),
        ))
    }
}

#[cfg(test)]
#[path = "set_context_tests.rs"]
mod tests;
