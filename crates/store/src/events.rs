// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inter-machine event repository — the durable fallback path for peer
//! delivery. Rows are created by senders whose fast-path socket was
//! unavailable and marked processed by the receiver after dispatch;
//! processed events are never re-delivered.

use crate::database::Database;
use crate::error::StoreError;
use crate::types::{parse_timestamp, EventStatus, MachineEvent};
use rusqlite::types::Value as SqlValue;

const EVENT_COLUMNS: &str =
    "id, source_machine, target_machine, event_type, job_id, payload, status, \
     created_at, processed_at";

/// Repository over the `machine_events` table.
pub struct MachineEvents<'a> {
    db: &'a Database,
}

impl<'a> MachineEvents<'a> {
    pub(crate) fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Queue an event for a target machine. Payload is an opaque string,
    /// conventionally JSON.
    pub fn send(
        &self,
        target_machine: &str,
        event_type: &str,
        source_machine: Option<&str>,
        job_id: Option<&str>,
        payload: Option<&str>,
    ) -> Result<i64, StoreError> {
        let conn = self.db.connection()?;
        conn.execute(
            "INSERT INTO machine_events (source_machine, target_machine, event_type, \
                 job_id, payload) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![source_machine, target_machine, event_type, job_id, payload],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Pending events for a machine, oldest first.
    pub fn pending(&self, machine_name: &str) -> Result<Vec<MachineEvent>, StoreError> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM machine_events \
             WHERE target_machine = ?1 AND status = 'pending' \
             ORDER BY created_at ASC, id ASC"
        );
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(rusqlite::params![machine_name])?;
        let mut events = Vec::new();
        while let Some(row) = rows.next()? {
            events.push(event_from_row(row)?);
        }
        Ok(events)
    }

    pub fn mark_processed(&self, id: i64) -> Result<(), StoreError> {
        let conn = self.db.connection()?;
        conn.execute(
            "UPDATE machine_events \
             SET status = 'processed', processed_at = CURRENT_TIMESTAMP \
             WHERE id = ?1",
            rusqlite::params![id],
        )?;
        Ok(())
    }

    pub fn list(
        &self,
        target_machine: Option<&str>,
        status: Option<EventStatus>,
        limit: usize,
    ) -> Result<Vec<MachineEvent>, StoreError> {
        let mut filters = String::new();
        let mut params: Vec<SqlValue> = Vec::new();
        if let Some(t) = target_machine {
            filters.push_str(" AND target_machine = ?");
            params.push(SqlValue::from(t.to_string()));
        }
        if let Some(s) = status {
            filters.push_str(" AND status = ?");
            params.push(SqlValue::from(s.to_string()));
        }
        params.push(SqlValue::from(limit as i64));

        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM machine_events WHERE 1=1{filters} \
             ORDER BY created_at DESC LIMIT ?"
        );
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(rusqlite::params_from_iter(params))?;
        let mut events = Vec::new();
        while let Some(row) = rows.next()? {
            events.push(event_from_row(row)?);
        }
        Ok(events)
    }
}

fn event_from_row(row: &rusqlite::Row<'_>) -> Result<MachineEvent, StoreError> {
    let status: String = row.get(6)?;
    Ok(MachineEvent {
        id: row.get(0)?,
        source_machine: row.get(1)?,
        target_machine: row.get(2)?,
        event_type: row.get(3)?,
        job_id: row.get(4)?,
        payload: row.get(5)?,
        status: EventStatus::parse(&status),
        created_at: parse_timestamp(row.get(7)?),
        processed_at: parse_timestamp(row.get(8)?),
    })
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
