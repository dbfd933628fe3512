// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Database handle and connection policy.

use crate::error::StoreError;
use crate::events::MachineEvents;
use crate::jobs::Jobs;
use crate::machines::MachineStates;
use crate::pipeline::PipelineResults;
use crate::realtime::RealtimeEvents;
use crate::schema::CORE_SCHEMA;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Default store location, relative to the working directory.
pub const DEFAULT_DB_PATH: &str = "data/pipeline.db";

/// Cheap cloneable handle to one SQLite database file.
///
/// The handle carries only the path. Connections are opened per operation
/// by the repositories and dropped on every exit path — holding one across
/// transactions is how the reference implementation leaked descriptors,
/// so none of the repository APIs expose a connection.
#[derive(Debug, Clone)]
pub struct Database {
    path: Arc<PathBuf>,
}

impl Database {
    /// Open (creating if needed) the database at `path` and run the core
    /// schema. The containing directory is created first.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        let db = Self {
            path: Arc::new(path),
        };
        db.run_schema(CORE_SCHEMA)?;
        Ok(db)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Execute schema fragments. Idempotent fragments may be run on every
    /// startup; callers with extra tables pass their own fragment set.
    pub fn run_schema(&self, fragments: &[&str]) -> Result<(), StoreError> {
        let conn = self.connection()?;
        for sql in fragments {
            conn.execute_batch(sql)?;
        }
        Ok(())
    }

    /// Open a connection for a single operation.
    ///
    /// WAL journaling lets concurrent engines share the file; the busy
    /// timeout bounds lock waits instead of failing fast.
    pub(crate) fn connection(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(self.path.as_ref())?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(conn)
    }

    pub fn jobs(&self) -> Jobs<'_> {
        Jobs::new(self)
    }

    pub fn machine_events(&self) -> MachineEvents<'_> {
        MachineEvents::new(self)
    }

    pub fn realtime_events(&self) -> RealtimeEvents<'_> {
        RealtimeEvents::new(self)
    }

    pub fn machine_states(&self) -> MachineStates<'_> {
        MachineStates::new(self)
    }

    pub fn pipeline_results(&self) -> PipelineResults<'_> {
        PipelineResults::new(self)
    }
}

#[cfg(test)]
#[path = "database_tests.rs"]
mod tests;
