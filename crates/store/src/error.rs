// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store error types

use thiserror::Error;

/// Errors surfaced by store operations.
///
/// The realtime-event writer never returns these — telemetry loss is
/// preferable to crashing the engine — but every other repository
/// operation propagates them as typed failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("job already exists: {0}")]
    Duplicate(String),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to create store directory {path}: {source}")]
    CreateDir {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
}
