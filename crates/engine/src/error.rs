// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine error types.
//!
//! Only startup problems surface here; once the loop is running, action
//! failures are converted to `error` events at the dispatch site.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] fsm_config::ConfigError),

    #[error(transparent)]
    Store(#[from] fsm_store::StoreError),

    #[error("failed to bind control socket {path}: {source}")]
    SocketBind {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("invalid initial context: {0}")]
    InitialContext(String),
}
