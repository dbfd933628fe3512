// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event-name conventions shared across the runtime.
//!
//! Events are plain strings chosen by config authors; this module holds
//! the handful the engine itself produces or treats specially, plus the
//! `timeout(<seconds>)` encoding used by timed transitions.

use std::time::Duration;

/// Synthetic event dispatched once after config load.
pub const START: &str = "start";
/// Dispatched after a `sleep` action completes, and sent as a bare
/// datagram to break a peer's idle wait.
pub const WAKE_UP: &str = "wake_up";
/// Funnel event for action failures.
pub const ERROR: &str = "error";
/// Routine self-loop events emitted by queue polling.
pub const NO_JOBS: &str = "no_jobs";
pub const NO_EVENTS: &str = "no_events";

/// Terminal state name: the loop exits when it is entered.
pub const STOPPED: &str = "stopped";

/// Events that routinely self-loop while idle; suppressed from telemetry
/// and rate-limited in logs.
pub fn is_idle_event(event: &str) -> bool {
    matches!(event, WAKE_UP | NO_JOBS | NO_EVENTS)
}

/// Parse a `timeout(<seconds>)` event name into its duration.
///
/// Seconds may be fractional (`timeout(0.5)`). Returns `None` for any
/// other event name or a non-finite/negative duration.
pub fn parse_timeout(event: &str) -> Option<Duration> {
    let secs: f64 = event
        .strip_prefix("timeout(")?
        .strip_suffix(')')?
        .trim()
        .parse()
        .ok()?;
    if secs.is_finite() && secs >= 0.0 {
        Some(Duration::from_secs_f64(secs))
    } else {
        None
    }
}

/// Format a duration back into its `timeout(<seconds>)` event name.
pub fn timeout_event(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs == secs.trunc() {
        format!("timeout({})", secs as u64)
    } else {
        format!("timeout({})", secs)
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
