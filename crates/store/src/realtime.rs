// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Realtime telemetry stream.
//!
//! The writer swallows every error: an engine must keep running when
//! telemetry cannot be recorded. Consumers (fan-out collectors) read
//! unconsumed ranges, mark them consumed, and garbage-collect by age.

use crate::database::Database;
use crate::error::StoreError;
use crate::types::{parse_blob, parse_timestamp, RealtimeEvent};
use serde_json::Value;

/// Repository over the `realtime_events` table.
pub struct RealtimeEvents<'a> {
    db: &'a Database,
}

impl<'a> RealtimeEvents<'a> {
    pub(crate) fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Append a telemetry record. Returns the row ID, or `None` on any
    /// failure — this path never raises.
    pub fn log(&self, machine_name: &str, event_type: &str, payload: &Value) -> Option<i64> {
        let result = (|| -> Result<i64, StoreError> {
            let conn = self.db.connection()?;
            conn.execute(
                "INSERT INTO realtime_events (machine_name, event_type, payload) \
                 VALUES (?1, ?2, ?3)",
                rusqlite::params![machine_name, event_type, payload.to_string()],
            )?;
            Ok(conn.last_insert_rowid())
        })();
        match result {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::debug!(error = %e, "failed to log realtime event");
                None
            }
        }
    }

    /// Unconsumed records after `since_id`, ID order.
    pub fn get_unconsumed(
        &self,
        since_id: i64,
        limit: usize,
    ) -> Result<Vec<RealtimeEvent>, StoreError> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(
            "SELECT id, machine_name, event_type, payload, created_at \
             FROM realtime_events \
             WHERE id > ?1 AND consumed = 0 \
             ORDER BY id LIMIT ?2",
        )?;
        let mut rows = stmt.query(rusqlite::params![since_id, limit as i64])?;
        let mut events = Vec::new();
        while let Some(row) = rows.next()? {
            let id: i64 = row.get(0)?;
            events.push(RealtimeEvent {
                id,
                machine_name: row.get(1)?,
                event_type: row.get(2)?,
                payload: parse_blob(row.get(3)?, "payload", &id.to_string()),
                created_at: parse_timestamp(row.get(4)?),
            });
        }
        Ok(events)
    }

    /// Mark a batch of records consumed. True when every ID was updated.
    pub fn mark_consumed(&self, ids: &[i64]) -> Result<bool, StoreError> {
        if ids.is_empty() {
            return Ok(true);
        }
        let placeholders = vec!["?"; ids.len()].join(",");
        let sql = format!(
            "UPDATE realtime_events \
             SET consumed = 1, consumed_at = CURRENT_TIMESTAMP \
             WHERE id IN ({placeholders})"
        );
        let conn = self.db.connection()?;
        let changed = conn.execute(&sql, rusqlite::params_from_iter(ids.iter()))?;
        Ok(changed == ids.len())
    }

    /// Delete consumed records older than the given age. Returns the
    /// number of rows removed.
    pub fn cleanup_consumed(&self, older_than_hours: u32) -> Result<usize, StoreError> {
        let conn = self.db.connection()?;
        let removed = conn.execute(
            "DELETE FROM realtime_events \
             WHERE consumed = 1 AND consumed_at < datetime('now', ?1)",
            rusqlite::params![format!("-{older_than_hours} hours")],
        )?;
        Ok(removed)
    }
}

#[cfg(test)]
#[path = "realtime_tests.rs"]
mod tests;
