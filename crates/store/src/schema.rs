// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Core schema fragments.
//!
//! Each fragment is idempotent (`IF NOT EXISTS`) and executed at startup.
//! User-defined tables coexist with the core set via
//! [`crate::Database::run_schema`].

pub(crate) const CORE_SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS jobs (
        job_id        TEXT PRIMARY KEY,
        job_type      TEXT NOT NULL,
        machine_type  TEXT,
        source_job_id TEXT,
        priority      INTEGER NOT NULL DEFAULT 5,
        status        TEXT NOT NULL DEFAULT 'pending',
        created_at    TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        started_at    TIMESTAMP,
        completed_at  TIMESTAMP,
        error_message TEXT,
        data          TEXT,
        result        TEXT,
        metadata      TEXT
    )",
    "CREATE INDEX IF NOT EXISTS idx_jobs_queue
        ON jobs(status, job_type, machine_type, priority, created_at)",
    "CREATE TABLE IF NOT EXISTS machine_events (
        id             INTEGER PRIMARY KEY AUTOINCREMENT,
        source_machine TEXT,
        target_machine TEXT NOT NULL,
        event_type     TEXT NOT NULL,
        job_id         TEXT,
        payload        TEXT,
        status         TEXT NOT NULL DEFAULT 'pending',
        created_at     TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        processed_at   TIMESTAMP
    )",
    "CREATE INDEX IF NOT EXISTS idx_machine_events_pending
        ON machine_events(target_machine, status, created_at)",
    "CREATE TABLE IF NOT EXISTS realtime_events (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        machine_name TEXT NOT NULL,
        event_type  TEXT NOT NULL,
        payload     TEXT,
        created_at  TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        consumed    INTEGER NOT NULL DEFAULT 0,
        consumed_at TIMESTAMP
    )",
    "CREATE INDEX IF NOT EXISTS idx_realtime_unconsumed
        ON realtime_events(consumed, id)",
    "CREATE TABLE IF NOT EXISTS machine_state (
        machine_name  TEXT PRIMARY KEY,
        current_state TEXT NOT NULL,
        last_activity REAL,
        pid           INTEGER,
        metadata      TEXT
    )",
    "CREATE TABLE IF NOT EXISTS pipeline_results (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        job_id       TEXT,
        step_name    TEXT NOT NULL,
        step_number  INTEGER NOT NULL DEFAULT 0,
        metadata     TEXT,
        completed_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE INDEX IF NOT EXISTS idx_pipeline_state_changes
        ON pipeline_results(step_name, id)",
];
