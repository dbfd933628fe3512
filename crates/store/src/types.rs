// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Row types shared by the repositories.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{json, Value};

/// Job lifecycle status. Monotonic except for the explicit
/// "reset stuck processing" admin path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

fsm_core::simple_display! {
    JobStatus {
        Pending => "pending",
        Processing => "processing",
        Completed => "completed",
        Failed => "failed",
    }
}

impl JobStatus {
    /// Parse a status column. Unknown text degrades to `Pending` with a
    /// warning rather than failing the read.
    pub fn parse(s: &str) -> Self {
        match s {
            "pending" => Self::Pending,
            "processing" => Self::Processing,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            other => {
                tracing::warn!(status = other, "unknown job status, treating as pending");
                Self::Pending
            }
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Peer-event delivery status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    Pending,
    Processed,
}

fsm_core::simple_display! {
    EventStatus {
        Pending => "pending",
        Processed => "processed",
    }
}

impl EventStatus {
    pub fn parse(s: &str) -> Self {
        match s {
            "processed" => Self::Processed,
            _ => Self::Pending,
        }
    }
}

/// One row of the job queue, JSON blobs parsed.
#[derive(Debug, Clone)]
pub struct Job {
    pub job_id: String,
    pub job_type: String,
    pub machine_type: Option<String>,
    pub source_job_id: Option<String>,
    pub priority: i64,
    pub status: JobStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub data: Value,
    pub result: Value,
    pub metadata: Value,
}

impl Job {
    /// Shape stored at `context.current_job` by queue actions.
    pub fn to_current_job(&self) -> Value {
        json!({
            "id": self.job_id,
            "source_job_id": self.source_job_id,
            "job_type": self.job_type,
            "data": self.data,
        })
    }

    /// Full map stored in context lists by batch reads.
    pub fn to_context_entry(&self) -> Value {
        json!({
            "job_id": self.job_id,
            "job_type": self.job_type,
            "machine_type": self.machine_type,
            "source_job_id": self.source_job_id,
            "priority": self.priority,
            "status": self.status.to_string(),
            "data": self.data,
        })
    }
}

/// An addressed peer-to-peer message row.
#[derive(Debug, Clone)]
pub struct MachineEvent {
    pub id: i64,
    pub source_machine: Option<String>,
    pub target_machine: String,
    pub event_type: String,
    pub job_id: Option<String>,
    pub payload: Option<String>,
    pub status: EventStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub processed_at: Option<DateTime<Utc>>,
}

/// A broadcast telemetry record, payload parsed.
#[derive(Debug, Clone)]
pub struct RealtimeEvent {
    pub id: i64,
    pub machine_name: String,
    pub event_type: String,
    pub payload: Value,
    pub created_at: Option<DateTime<Utc>>,
}

/// Latest known state of one running machine.
#[derive(Debug, Clone)]
pub struct MachineState {
    pub machine_name: String,
    pub current_state: String,
    /// Epoch seconds of the last upsert; stale rows mean "not running".
    pub last_activity: Option<f64>,
    pub pid: Option<i64>,
    pub metadata: Value,
}

/// Parse a SQLite `CURRENT_TIMESTAMP` text column.
pub(crate) fn parse_timestamp(raw: Option<String>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    let naive = NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()?;
    Some(naive.and_utc())
}

/// Parse a JSON blob column. Malformed JSON degrades to an empty map with
/// a warning; absent columns become an empty map too, so callers can
/// always treat the field as an object.
pub(crate) fn parse_blob(raw: Option<String>, what: &str, id: &str) -> Value {
    match raw {
        None => json!({}),
        Some(text) => match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(job_id = id, field = what, "failed to parse JSON blob");
                json!({})
            }
        },
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
