// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Socket path naming for one runtime namespace.
//!
//! All IPC is same-host datagram sockets under a common directory. The
//! prefix is configurable so multiple runtime namespaces (and test runs)
//! can coexist on one machine without crosstalk.

use std::path::{Path, PathBuf};

/// Default prefix for socket file names.
pub const DEFAULT_PREFIX: &str = "statemachine";

/// Names the socket files for one runtime namespace.
#[derive(Debug, Clone)]
pub struct SocketNamespace {
    prefix: String,
    dir: PathBuf,
}

impl Default for SocketNamespace {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl SocketNamespace {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            dir: PathBuf::from("/tmp"),
        }
    }

    /// Use a different socket directory. Tests point this at a tempdir;
    /// note the ~100 byte limit on unix socket paths.
    pub fn with_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Shared telemetry socket: `<dir>/<prefix>-events.sock`.
    pub fn events_path(&self) -> PathBuf {
        self.dir.join(format!("{}-events.sock", self.prefix))
    }

    /// Per-machine control socket: `<dir>/<prefix>-control-<machine>.sock`.
    pub fn control_path(&self, machine: &str) -> PathBuf {
        self.dir
            .join(format!("{}-control-{}.sock", self.prefix, machine))
    }
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
