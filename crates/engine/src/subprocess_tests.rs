// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn captures_exit_code_and_output() {
    let outcome = run_shell("echo hello; echo oops >&2; exit 3", Duration::from_secs(5))
        .await
        .unwrap();
    match outcome {
        ShellOutcome::Exited {
            code,
            stdout,
            stderr,
        } => {
            assert_eq!(code, Some(3));
            assert_eq!(stdout.trim(), "hello");
            assert_eq!(stderr.trim(), "oops");
        }
        ShellOutcome::TimedOut => panic!("unexpected timeout"),
    }
}

#[tokio::test]
async fn zero_exit() {
    let outcome = run_shell("true", Duration::from_secs(5)).await.unwrap();
    assert!(matches!(
        outcome,
        ShellOutcome::Exited { code: Some(0), .. }
    ));
}

#[tokio::test]
async fn timeout_kills_the_process_group() {
    let start = std::time::Instant::now();
    let outcome = run_shell("sleep 30", Duration::from_millis(200)).await.unwrap();
    assert!(matches!(outcome, ShellOutcome::TimedOut));
    // SIGTERM lands immediately for sleep; no grace wait needed
    assert!(start.elapsed() < Duration::from_secs(5));
}
