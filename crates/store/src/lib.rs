// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fsm-store: SQLite persistence for the state machine runtime.
//!
//! One database file holds the job queue, the inter-machine event queue,
//! the realtime telemetry stream, per-machine state snapshots, and the
//! append-only transition log. Every repository operation opens its own
//! connection and releases it on all exit paths — connections never
//! outlive a single operation.

mod database;
mod error;
mod events;
mod jobs;
mod machines;
mod pipeline;
mod realtime;
mod schema;
mod types;

pub use database::{Database, DEFAULT_DB_PATH};
pub use error::StoreError;
pub use events::MachineEvents;
pub use jobs::{Jobs, NewJob};
pub use machines::MachineStates;
pub use pipeline::{PipelineResults, StateChange};
pub use realtime::RealtimeEvents;
pub use types::{EventStatus, Job, JobStatus, MachineEvent, MachineState, RealtimeEvent};
