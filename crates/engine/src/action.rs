// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The action contract.
//!
//! An action is constructed from its engine-interpolated config map and
//! executed against the live context. It may mutate context freely and
//! return an event name for the engine to dispatch; `None` keeps the
//! current state. Errors are caught at the dispatch site and become
//! `error` events.

use crate::sockets::Telemetry;
use async_trait::async_trait;
use fsm_core::{Context, Map, SocketNamespace};
use fsm_store::Database;
use thiserror::Error;

/// Errors an action can raise. The engine records the message in
/// `last_error`, emits an error telemetry record, and dispatches `error`.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("invalid action config: {0}")]
    Config(String),

    #[error(transparent)]
    Store(#[from] fsm_store::StoreError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Failed(String),
}

/// Services an action may call on the core.
pub struct ActionEnv {
    pub db: Database,
    pub machine_name: String,
    pub namespace: SocketNamespace,
    pub telemetry: Telemetry,
}

/// A unit of work attached to a state.
#[async_trait]
pub trait Action: Send + Sync + std::fmt::Debug {
    /// Run the action. `Some(event)` is dispatched through the
    /// transition table; `None` leaves the engine in its current state.
    async fn execute(&self, env: &ActionEnv, ctx: &mut Context) -> Result<Option<String>, ActionError>;
}

/// Deserialize a typed action config from the interpolated config map.
///
/// Unknown keys are permitted — configs carry routing keys (`success`,
/// `error`, `description`) and free-form extras alongside each action's
/// own options.
pub(crate) fn from_config<T: serde::de::DeserializeOwned>(config: &Map) -> Result<T, ActionError> {
    serde_json::from_value(serde_json::Value::Object(config.clone()))
        .map_err(|e| ActionError::Config(e.to_string()))
}
