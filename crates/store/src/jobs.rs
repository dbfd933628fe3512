// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job queue repository.
//!
//! Jobs move pending → processing via [`Jobs::get_next`] (pick-and-claim)
//! or [`Jobs::claim`] (targeted CAS), then to a terminal completed or
//! failed status. Both claim paths are single SQL statements so two
//! engines can never take the same row.

use crate::database::Database;
use crate::error::StoreError;
use crate::types::{parse_blob, parse_timestamp, Job, JobStatus};
use rusqlite::types::Value as SqlValue;
use serde_json::Value;
use std::collections::HashMap;

const JOB_COLUMNS: &str = "job_id, job_type, machine_type, source_job_id, priority, status, \
     created_at, started_at, completed_at, error_message, data, result, metadata";

/// Parameters for [`Jobs::create`].
#[derive(Debug, Clone)]
pub struct NewJob {
    job_id: String,
    job_type: String,
    machine_type: Option<String>,
    source_job_id: Option<String>,
    priority: i64,
    data: Value,
    metadata: Value,
}

impl NewJob {
    pub fn new(job_id: impl Into<String>, job_type: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            job_type: job_type.into(),
            machine_type: None,
            source_job_id: None,
            priority: 5,
            data: Value::Null,
            metadata: Value::Null,
        }
    }

    fsm_core::setters! {
        set {
            priority: i64,
            data: Value,
            metadata: Value,
        }
        option {
            machine_type: String,
            source_job_id: String,
        }
    }
}

/// Repository over the `jobs` table.
pub struct Jobs<'a> {
    db: &'a Database,
}

impl<'a> Jobs<'a> {
    pub(crate) fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Insert a pending job. Fails with [`StoreError::Duplicate`] when the
    /// ID already exists.
    pub fn create(&self, job: NewJob) -> Result<i64, StoreError> {
        let conn = self.db.connection()?;
        let result = conn.execute(
            "INSERT INTO jobs (job_id, job_type, machine_type, source_job_id, priority, \
                 data, metadata, status) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'pending')",
            rusqlite::params![
                job.job_id,
                job.job_type,
                job.machine_type,
                job.source_job_id,
                job.priority,
                blob_param(&job.data),
                blob_param(&job.metadata),
            ],
        );
        match result {
            Ok(_) => Ok(conn.last_insert_rowid()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::Duplicate(job.job_id))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Atomically pick and claim the next pending job.
    ///
    /// Lowest priority number first, ties broken by earliest creation.
    /// The machine filter applies only when `machine_type` is `Some`;
    /// a `None` machine matches rows with any target — the mode a
    /// controller uses to claim on behalf of its workers.
    pub fn get_next(
        &self,
        job_type: Option<&str>,
        machine_type: Option<&str>,
    ) -> Result<Option<Job>, StoreError> {
        let mut filters = String::new();
        let mut params: Vec<SqlValue> = Vec::new();
        if let Some(t) = job_type {
            filters.push_str(" AND job_type = ?");
            params.push(SqlValue::from(t.to_string()));
        }
        if let Some(m) = machine_type {
            filters.push_str(" AND machine_type = ?");
            params.push(SqlValue::from(m.to_string()));
        }

        let sql = format!(
            "UPDATE jobs SET status = 'processing', started_at = CURRENT_TIMESTAMP \
             WHERE status = 'pending' AND job_id = ( \
                 SELECT job_id FROM jobs WHERE status = 'pending'{filters} \
                 ORDER BY priority ASC, created_at ASC, job_id ASC LIMIT 1) \
             RETURNING {JOB_COLUMNS}"
        );

        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(rusqlite::params_from_iter(params))?;
        match rows.next()? {
            Some(row) => Ok(Some(job_from_row(row)?)),
            None => Ok(None),
        }
    }

    /// Non-mutating batch read of pending jobs, queue order.
    pub fn get_pending(
        &self,
        job_type: Option<&str>,
        machine_type: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<Job>, StoreError> {
        let mut filters = String::new();
        let mut params: Vec<SqlValue> = Vec::new();
        if let Some(t) = job_type {
            filters.push_str(" AND job_type = ?");
            params.push(SqlValue::from(t.to_string()));
        }
        if let Some(m) = machine_type {
            filters.push_str(" AND machine_type = ?");
            params.push(SqlValue::from(m.to_string()));
        }
        // LIMIT -1 means unbounded in SQLite
        params.push(SqlValue::from(limit.map(|l| l as i64).unwrap_or(-1)));

        let sql = format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE status = 'pending'{filters} \
             ORDER BY priority ASC, created_at ASC, job_id ASC LIMIT ?"
        );
        self.query_jobs(&sql, params)
    }

    /// Compare-and-swap claim: pending → processing for exactly one row.
    pub fn claim(&self, job_id: &str) -> Result<bool, StoreError> {
        let conn = self.db.connection()?;
        let changed = conn.execute(
            "UPDATE jobs SET status = 'processing', started_at = CURRENT_TIMESTAMP \
             WHERE job_id = ?1 AND status = 'pending'",
            rusqlite::params![job_id],
        )?;
        Ok(changed == 1)
    }

    pub fn complete(&self, job_id: &str) -> Result<(), StoreError> {
        let conn = self.db.connection()?;
        conn.execute(
            "UPDATE jobs SET status = 'completed', completed_at = CURRENT_TIMESTAMP \
             WHERE job_id = ?1",
            rusqlite::params![job_id],
        )?;
        Ok(())
    }

    pub fn fail(&self, job_id: &str, error_message: &str) -> Result<(), StoreError> {
        let conn = self.db.connection()?;
        conn.execute(
            "UPDATE jobs SET status = 'failed', error_message = ?2, \
                 completed_at = CURRENT_TIMESTAMP \
             WHERE job_id = ?1",
            rusqlite::params![job_id, error_message],
        )?;
        Ok(())
    }

    /// Admin path: put a stuck processing job back in the queue.
    pub fn reset_to_pending(&self, job_id: &str, reason: &str) -> Result<bool, StoreError> {
        let conn = self.db.connection()?;
        let changed = conn.execute(
            "UPDATE jobs SET status = 'pending', started_at = NULL, error_message = ?2 \
             WHERE job_id = ?1 AND status = 'processing'",
            rusqlite::params![job_id, reason],
        )?;
        Ok(changed == 1)
    }

    pub fn get(&self, job_id: &str) -> Result<Option<Job>, StoreError> {
        let conn = self.db.connection()?;
        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE job_id = ?1");
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(rusqlite::params![job_id])?;
        match rows.next()? {
            Some(row) => Ok(Some(job_from_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn list(
        &self,
        status: Option<JobStatus>,
        job_type: Option<&str>,
        machine_type: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Job>, StoreError> {
        let (filters, mut params) = job_filters(status, job_type, machine_type);
        params.push(SqlValue::from(limit as i64));
        let sql = format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE 1=1{filters} \
             ORDER BY created_at DESC LIMIT ?"
        );
        self.query_jobs(&sql, params)
    }

    pub fn count(
        &self,
        status: Option<JobStatus>,
        job_type: Option<&str>,
        machine_type: Option<&str>,
    ) -> Result<i64, StoreError> {
        let (filters, params) = job_filters(status, job_type, machine_type);
        let sql = format!("SELECT COUNT(*) FROM jobs WHERE 1=1{filters}");
        let conn = self.db.connection()?;
        let count = conn.query_row(&sql, rusqlite::params_from_iter(params), |row| row.get(0))?;
        Ok(count)
    }

    /// Statuses for a set of tracked job IDs. Missing IDs are absent from
    /// the result; callers treat them as still pending.
    pub fn statuses(&self, job_ids: &[String]) -> Result<HashMap<String, JobStatus>, StoreError> {
        if job_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let placeholders = vec!["?"; job_ids.len()].join(",");
        let sql = format!("SELECT job_id, status FROM jobs WHERE job_id IN ({placeholders})");
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(job_ids.iter()),
            |row| {
                let id: String = row.get(0)?;
                let status: String = row.get(1)?;
                Ok((id, status))
            },
        )?;
        let mut map = HashMap::new();
        for row in rows {
            let (id, status) = row?;
            map.insert(id, JobStatus::parse(&status));
        }
        Ok(map)
    }

    fn query_jobs(&self, sql: &str, params: Vec<SqlValue>) -> Result<Vec<Job>, StoreError> {
        let conn = self.db.connection()?;
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query(rusqlite::params_from_iter(params))?;
        let mut jobs = Vec::new();
        while let Some(row) = rows.next()? {
            jobs.push(job_from_row(row)?);
        }
        Ok(jobs)
    }
}

fn job_filters(
    status: Option<JobStatus>,
    job_type: Option<&str>,
    machine_type: Option<&str>,
) -> (String, Vec<SqlValue>) {
    let mut filters = String::new();
    let mut params: Vec<SqlValue> = Vec::new();
    if let Some(s) = status {
        filters.push_str(" AND status = ?");
        params.push(SqlValue::from(s.to_string()));
    }
    if let Some(t) = job_type {
        filters.push_str(" AND job_type = ?");
        params.push(SqlValue::from(t.to_string()));
    }
    if let Some(m) = machine_type {
        filters.push_str(" AND machine_type = ?");
        params.push(SqlValue::from(m.to_string()));
    }
    (filters, params)
}

/// Empty and null blobs are stored as NULL, not `"{}"`.
fn blob_param(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Object(map) if map.is_empty() => None,
        other => Some(other.to_string()),
    }
}

fn job_from_row(row: &rusqlite::Row<'_>) -> Result<Job, StoreError> {
    let job_id: String = row.get(0)?;
    let status: String = row.get(5)?;
    Ok(Job {
        job_type: row.get(1)?,
        machine_type: row.get(2)?,
        source_job_id: row.get(3)?,
        priority: row.get(4)?,
        status: JobStatus::parse(&status),
        created_at: parse_timestamp(row.get(6)?),
        started_at: parse_timestamp(row.get(7)?),
        completed_at: parse_timestamp(row.get(8)?),
        error_message: row.get(9)?,
        data: parse_blob(row.get(10)?, "data", &job_id),
        result: parse_blob(row.get(11)?, "result", &job_id),
        metadata: parse_blob(row.get(12)?, "metadata", &job_id),
        job_id,
    })
}

#[cfg(test)]
#[path = "jobs_tests.rs"]
mod tests;
