// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append a value to a context list, creating it if absent.

use crate::action::{Action, ActionEnv, ActionError};
use async_trait::async_trait;
use fsm_core::Context;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct AddToListAction {
    #[serde(default = "default_list_key")]
    list_key: String,
    /// Already templated by the engine pass; single-placeholder
    /// templates keep their original type.
    value: Value,
    #[serde(default)]
    success: Option<String>,
}

fn default_list_key() -> String {
    "items".to_string()
}

#[async_trait]
impl Action for AddToListAction {
    async fn execute(&self, env: &ActionEnv, ctx: &mut Context) -> Result<Option<String>, ActionError> {
        let machine = env.machine_name.as_str();

        if let Value::String(s) = &self.value {
            if s.contains('{') && s.contains('}') {
                // Might be intentional; surfaced for template debugging
                tracing::warn!(machine, value = %s, "value contains unresolved variables");
            }
        }

        let mut items = match ctx.get(&self.list_key) {
            Some(Value::Array(items)) => items.clone(),
            Some(other) => {
                tracing::error!(
                    machine,
                    key = %self.list_key,
                    found = ?other,
                    "context key is not a list"
                );
                return Ok(Some("error".to_string()));
            }
            None => {
                tracing::debug!(machine, key = %self.list_key, "created new list in context");
                Vec::new()
            }
        };

        items.push(self.value.clone());
        let count = items.len();
        ctx.set(self.list_key.clone(), items);
        tracing::info!(machine, key = %self.list_key, count, "added item to list");

        Ok(Some(
            self.success.clone().unwrap_or_else(|| "success".to_string()),
        ))
    }
}

#[cfg(test)]
#[path = "add_to_list_tests.rs"]
mod tests;
