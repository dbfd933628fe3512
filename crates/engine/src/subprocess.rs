// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shell subprocess execution with bounded waits.
//!
//! Commands run through `sh -c` in their own process group so a timeout
//! can take down the whole tree: SIGTERM first, SIGKILL after the grace
//! window.

use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use std::os::unix::process::CommandExt;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

/// Grace period between SIGTERM and SIGKILL on timeout.
pub const KILL_GRACE: Duration = Duration::from_secs(5);

/// Default timeout for shell commands when the action config gives none.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of a bounded shell run.
#[derive(Debug)]
pub enum ShellOutcome {
    /// The command exited; code is `None` when killed by a signal.
    Exited {
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
    /// The timeout elapsed and the process group was killed.
    TimedOut,
}

/// Run `sh -c <command>` with a timeout.
pub async fn run_shell(command: &str, timeout: Duration) -> std::io::Result<ShellOutcome> {
    let mut std_cmd = std::process::Command::new("sh");
    std_cmd
        .arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    // Own process group, so the timeout path can signal the whole tree
    std_cmd.process_group(0);

    let mut cmd = Command::from(std_cmd);
    cmd.kill_on_drop(true);
    let mut child = cmd.spawn()?;
    let pid = child.id();

    let stdout_pipe = child.stdout.take();
    let stderr_pipe = child.stderr.take();
    let stdout_task = tokio::spawn(read_pipe(stdout_pipe));
    let stderr_task = tokio::spawn(read_pipe(stderr_pipe));

    match tokio::time::timeout(timeout, child.wait()).await {
        Ok(status) => {
            let status = status?;
            let stdout = stdout_task.await.unwrap_or_default();
            let stderr = stderr_task.await.unwrap_or_default();
            Ok(ShellOutcome::Exited {
                code: status.code(),
                stdout,
                stderr,
            })
        }
        Err(_elapsed) => {
            terminate_group(pid);
            if tokio::time::timeout(KILL_GRACE, child.wait()).await.is_err() {
                kill_group(pid);
                let _ = child.wait().await;
            }
            stdout_task.abort();
            stderr_task.abort();
            Ok(ShellOutcome::TimedOut)
        }
    }
}

async fn read_pipe<R: tokio::io::AsyncRead + Unpin>(pipe: Option<R>) -> String {
    let Some(mut pipe) = pipe else {
        return String::new();
    };
    let mut buf = Vec::new();
    let _ = pipe.read_to_end(&mut buf).await;
    String::from_utf8_lossy(&buf).into_owned()
}

fn terminate_group(pid: Option<u32>) {
    if let Some(pid) = pid {
        if let Err(e) = killpg(Pid::from_raw(pid as i32), Signal::SIGTERM) {
            tracing::debug!(pid, error = %e, "SIGTERM to process group failed");
        }
    }
}

fn kill_group(pid: Option<u32>) {
    if let Some(pid) = pid {
        if let Err(e) = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
            tracing::debug!(pid, error = %e, "SIGKILL to process group failed");
        }
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
