// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Machine state snapshots.
//!
//! The engine upserts its row on startup and on every state change. Rows
//! go stale when a process dies; downstream consumers treat anything
//! older than their freshness threshold as "not running".

use crate::database::Database;
use crate::error::StoreError;
use crate::types::{parse_blob, MachineState};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

/// Repository over the `machine_state` table.
pub struct MachineStates<'a> {
    db: &'a Database,
}

impl<'a> MachineStates<'a> {
    pub(crate) fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Insert or update the row for one machine, stamping last_activity
    /// with the current time.
    pub fn upsert(
        &self,
        machine_name: &str,
        current_state: &str,
        pid: Option<i64>,
        metadata: Option<&Value>,
    ) -> Result<(), StoreError> {
        let last_activity = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64();
        let conn = self.db.connection()?;
        conn.execute(
            "INSERT INTO machine_state (machine_name, current_state, last_activity, pid, metadata) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             ON CONFLICT(machine_name) DO UPDATE SET \
                 current_state = excluded.current_state, \
                 last_activity = excluded.last_activity, \
                 pid = excluded.pid, \
                 metadata = excluded.metadata",
            rusqlite::params![
                machine_name,
                current_state,
                last_activity,
                pid,
                metadata.map(|m| m.to_string()),
            ],
        )?;
        Ok(())
    }

    pub fn all(&self) -> Result<Vec<MachineState>, StoreError> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(
            "SELECT machine_name, current_state, last_activity, pid, metadata \
             FROM machine_state ORDER BY machine_name",
        )?;
        let mut rows = stmt.query([])?;
        let mut machines = Vec::new();
        while let Some(row) = rows.next()? {
            machines.push(state_from_row(row)?);
        }
        Ok(machines)
    }

    pub fn get(&self, machine_name: &str) -> Result<Option<MachineState>, StoreError> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(
            "SELECT machine_name, current_state, last_activity, pid, metadata \
             FROM machine_state WHERE machine_name = ?1",
        )?;
        let mut rows = stmt.query(rusqlite::params![machine_name])?;
        match rows.next()? {
            Some(row) => Ok(Some(state_from_row(row)?)),
            None => Ok(None),
        }
    }
}

fn state_from_row(row: &rusqlite::Row<'_>) -> Result<MachineState, StoreError> {
    let machine_name: String = row.get(0)?;
    Ok(MachineState {
        current_state: row.get(1)?,
        last_activity: row.get(2)?,
        pid: row.get(3)?,
        metadata: parse_blob(row.get(4)?, "metadata", &machine_name),
        machine_name,
    })
}

#[cfg(test)]
#[path = "machines_tests.rs"]
mod tests;
