// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pop the first item from a context list.
//!
//! Controllers iterate batches with this: pop → process → loop until
//! the empty event fires.

use crate::action::{Action, ActionEnv, ActionError};
use async_trait::async_trait;
use fsm_core::Context;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct PopFromListAction {
    #[serde(default = "default_list_key")]
    list_key: String,
    #[serde(default)]
    store_as: Option<String>,
    #[serde(default)]
    success: Option<String>,
    #[serde(default)]
    empty: Option<String>,
}

fn default_list_key() -> String {
    "items".to_string()
}

#[async_trait]
impl Action for PopFromListAction {
    async fn execute(&self, env: &ActionEnv, ctx: &mut Context) -> Result<Option<String>, ActionError> {
        let machine = env.machine_name.as_str();
        let empty_event = self
            .empty
            .clone()
            .unwrap_or_else(|| "list_empty".to_string());

        let mut items = match ctx.get(&self.list_key) {
            Some(Value::Array(items)) => items.clone(),
            Some(other) => {
                tracing::error!(
                    machine,
                    key = %self.list_key,
                    found = %type_name(other),
                    "context key is not a list"
                );
                return Ok(Some(empty_event));
            }
            None => Vec::new(),
        };

        if items.is_empty() {
            tracing::info!(machine, key = %self.list_key, "list is empty");
            return Ok(Some(empty_event));
        }

        let item = items.remove(0);
        let remaining = items.len();
        ctx.set(self.list_key.clone(), items);

        if let Some(store_as) = &self.store_as {
            tracing::info!(
                machine,
                from = %self.list_key,
                to = %store_as,
                remaining,
                "popped item"
            );
            ctx.set(store_as.clone(), item);
        } else {
            tracing::info!(machine, from = %self.list_key, remaining, "popped item");
        }

        Ok(Some(
            self.success
                .clone()
                .unwrap_or_else(|| "item_popped".to_string()),
        ))
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

#[cfg(test)]
#[path = "pop_from_list_tests.rs"]
mod tests;
