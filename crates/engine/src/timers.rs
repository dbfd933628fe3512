// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timed-transition deadlines.
//!
//! Timers are data owned by the engine task, not spawned tasks: armed on
//! state entry, cancelled wholesale on state change, polled at the loop
//! head and between actions. The shortest deadline fires first; the
//! resulting state change cancels the rest.

use std::time::{Duration, Instant};

#[derive(Debug)]
struct Timer {
    event: String,
    fires_at: Instant,
}

/// Deadlines for the current state's timed transitions.
#[derive(Debug, Default)]
pub(crate) struct TimerSet {
    timers: Vec<Timer>,
}

impl TimerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all timers with the entered state's timed transitions.
    /// Re-entering a state restarts its timers.
    pub fn arm(&mut self, timed: &[(&str, Duration)], now: Instant) {
        self.timers.clear();
        for (event, duration) in timed {
            self.timers.push(Timer {
                event: event.to_string(),
                fires_at: now + *duration,
            });
        }
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }

    /// Remove and return the events of all timers due at `now`, earliest
    /// deadline first.
    pub fn fired(&mut self, now: Instant) -> Vec<String> {
        let mut due: Vec<Timer> = Vec::new();
        let mut i = 0;
        while i < self.timers.len() {
            if self.timers[i].fires_at <= now {
                due.push(self.timers.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by_key(|t| t.fires_at);
        due.into_iter().map(|t| t.event).collect()
    }

    /// Earliest pending deadline, for bounding the loop sleep.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.iter().map(|t| t.fires_at).min()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

#[cfg(test)]
#[path = "timers_tests.rs"]
mod tests;
