// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Datagram sockets: the shared telemetry bus and the per-machine
//! control inbox.
//!
//! Telemetry sends are fire-and-forget with reconnect-on-next-emit and a
//! store fallback so records still reach observers when no collector
//! socket is bound. The control socket is owned exclusively by its
//! engine; peers open a fresh client socket per send.

use fsm_core::SocketNamespace;
use fsm_store::Database;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::os::unix::net::UnixDatagram as StdUnixDatagram;
use std::path::{Path, PathBuf};
use tokio::net::UnixDatagram;

use crate::error::EngineError;

/// Largest datagram the control socket will accept.
const MAX_DATAGRAM: usize = 64 * 1024;

/// Send one JSON object as a datagram to a socket path, using a fresh
/// unbound client socket. Fails fast when the peer socket is missing.
pub fn send_datagram(path: &Path, message: &Value) -> std::io::Result<()> {
    let socket = StdUnixDatagram::unbound()?;
    socket.set_nonblocking(true)?;
    socket.send_to(message.to_string().as_bytes(), path)?;
    Ok(())
}

/// Telemetry emitter for the shared events socket.
pub struct Telemetry {
    machine_name: String,
    path: PathBuf,
    socket: Mutex<Option<StdUnixDatagram>>,
    db: Database,
}

impl Telemetry {
    /// Create the emitter, attempting an initial (non-fatal) connect.
    pub fn new(machine_name: impl Into<String>, namespace: &SocketNamespace, db: Database) -> Self {
        let path = namespace.events_path();
        let socket = Mutex::new(connect(&path));
        Self {
            machine_name: machine_name.into(),
            path,
            socket,
            db,
        }
    }

    /// Emit a telemetry record: `{machine_name, event_type, payload}`.
    ///
    /// Fast path is a non-blocking datagram send; any failure falls back
    /// to the realtime_events table (which itself never raises) and the
    /// socket is reconnected on the next emit.
    pub fn emit(&self, event_type: &str, payload: Value) {
        let record = json!({
            "machine_name": self.machine_name,
            "event_type": event_type,
            "payload": payload,
        });

        let mut guard = self.socket.lock();
        if guard.is_none() {
            *guard = connect(&self.path);
        }
        if let Some(socket) = guard.as_ref() {
            match socket.send(record.to_string().as_bytes()) {
                Ok(_) => return,
                Err(e) => {
                    tracing::debug!(error = %e, "event socket send failed");
                    *guard = None;
                }
            }
        }
        drop(guard);

        // Telemetry loss is preferable to crashing: the store writer
        // swallows its own errors too.
        self.db
            .realtime_events()
            .log(&self.machine_name, event_type, &payload);
    }
}

fn connect(path: &Path) -> Option<StdUnixDatagram> {
    let socket = StdUnixDatagram::unbound().ok()?;
    socket.set_nonblocking(true).ok()?;
    match socket.connect(path) {
        Ok(()) => Some(socket),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "event socket not available");
            None
        }
    }
}

/// One decoded control datagram, payload auto-parsed.
#[derive(Debug, Clone)]
pub struct IncomingEvent {
    pub event_type: String,
    /// The whole decoded record, stored at `context.event_data`.
    pub record: Value,
}

/// The per-machine datagram inbox.
pub struct ControlSocket {
    path: PathBuf,
    socket: UnixDatagram,
}

impl ControlSocket {
    /// Remove any stale socket file and bind. An unbindable socket is an
    /// unrecoverable startup failure.
    pub fn bind(namespace: &SocketNamespace, machine_name: &str) -> Result<Self, EngineError> {
        let path = namespace.control_path(machine_name);
        if path.exists() {
            if let Err(e) = std::fs::remove_file(&path) {
                tracing::debug!(path = %path.display(), error = %e, "failed to remove stale socket");
            } else {
                tracing::debug!(path = %path.display(), "removed stale socket");
            }
        }
        let socket = UnixDatagram::bind(&path).map_err(|source| EngineError::SocketBind {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), "control socket listening");
        Ok(Self { path, socket })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drain one datagram if present.
    ///
    /// Malformed outer JSON is logged and discarded. A string `payload`
    /// is parsed as JSON and replaced in place; an unparseable one
    /// becomes an empty map with a warning — peers rely on this
    /// auto-parse contract.
    pub fn try_recv(&self) -> Option<IncomingEvent> {
        let mut buf = [0u8; MAX_DATAGRAM];
        let len = match self.socket.try_recv(&mut buf) {
            Ok(len) => len,
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => return None,
            Err(e) => {
                tracing::debug!(error = %e, "control socket error");
                return None;
            }
        };

        let mut record: Value = match serde_json::from_slice(&buf[..len]) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(error = %e, "invalid JSON in control event");
                return None;
            }
        };

        let event_type = record
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();

        auto_parse_payload(&mut record, &event_type);
        Some(IncomingEvent { event_type, record })
    }

    /// Wait until the socket is readable, bounded by `timeout`. Used as
    /// the loop's adaptive sleep so a datagram cuts the idle wait short.
    pub async fn readable_timeout(&self, timeout: std::time::Duration) {
        let _ = tokio::time::timeout(timeout, self.socket.readable()).await;
    }
}

impl Drop for ControlSocket {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::debug!(path = %self.path.display(), error = %e, "control socket cleanup failed");
        } else {
            tracing::info!(path = %self.path.display(), "cleaned up control socket");
        }
    }
}

/// Replace a string `payload` with its parsed JSON, or an empty map when
/// it does not parse.
pub(crate) fn auto_parse_payload(record: &mut Value, event_type: &str) {
    let Some(payload) = record.get("payload") else {
        return;
    };
    let Some(text) = payload.as_str() else {
        return;
    };
    match serde_json::from_str::<Value>(text) {
        Ok(parsed) => {
            tracing::debug!(
                fields = parsed.as_object().map(|m| m.len()).unwrap_or(0),
                "parsed JSON payload"
            );
            record["payload"] = parsed;
        }
        Err(e) => {
            tracing::warn!(
                event_type,
                error = %e,
                raw = &text[..text.len().min(100)],
                "invalid JSON payload, using empty map"
            );
            record["payload"] = json!({});
        }
    }
}

#[cfg(test)]
#[path = "sockets_tests.rs"]
mod tests;
