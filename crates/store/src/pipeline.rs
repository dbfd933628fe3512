// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only transition log.
//!
//! One row per state transition, written by the engine alongside its
//! telemetry. The check_machine_state action reads the latest row for a
//! peer instead of opening sockets.

use crate::database::Database;
use crate::error::StoreError;
use crate::types::parse_timestamp;
use chrono::{DateTime, Utc};
use serde_json::json;

/// The latest recorded transition for one machine.
#[derive(Debug, Clone)]
pub struct StateChange {
    pub state: String,
    pub event: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Repository over the `pipeline_results` table.
pub struct PipelineResults<'a> {
    db: &'a Database,
}

impl<'a> PipelineResults<'a> {
    pub(crate) fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Append a state-change row. Metadata carries `{machine, state,
    /// event}` for the peer-state readers.
    pub fn record_state_change(
        &self,
        machine_name: &str,
        state: &str,
        event: &str,
        job_id: Option<&str>,
    ) -> Result<i64, StoreError> {
        let metadata = json!({
            "machine": machine_name,
            "state": state,
            "event": event,
        });
        let conn = self.db.connection()?;
        conn.execute(
            "INSERT INTO pipeline_results (job_id, step_name, step_number, metadata) \
             VALUES (?1, 'state_change', 0, ?2)",
            rusqlite::params![job_id, metadata.to_string()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Latest state-change row for a machine, or `None` if it never
    /// reported.
    pub fn latest_state_change(
        &self,
        machine_name: &str,
    ) -> Result<Option<StateChange>, StoreError> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(
            "SELECT json_extract(metadata, '$.state'), \
                    json_extract(metadata, '$.event'), \
                    completed_at \
             FROM pipeline_results \
             WHERE step_name = 'state_change' \
               AND json_extract(metadata, '$.machine') = ?1 \
             ORDER BY id DESC LIMIT 1",
        )?;
        let mut rows = stmt.query(rusqlite::params![machine_name])?;
        match rows.next()? {
            Some(row) => {
                let state: Option<String> = row.get(0)?;
                let event: Option<String> = row.get(1)?;
                match state {
                    Some(state) => Ok(Some(StateChange {
                        state,
                        event,
                        completed_at: parse_timestamp(row.get(2)?),
                    })),
                    None => Ok(None),
                }
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
