// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! statemachine — run one YAML-defined state machine process.
//!
//! Exit codes: 0 on a clean `stopped` state (or cooperative shutdown),
//! 1 on unrecoverable startup failure (missing/invalid config,
//! unbindable control socket).

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod args;
mod logging;

use anyhow::Context as _;
use args::Args;
use clap::Parser;
use fsm_core::SocketNamespace;
use fsm_engine::{Engine, EngineOptions};
use std::process::ExitCode;
use tokio::signal::unix::{signal, SignalKind};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let _log_guard = logging::init(args.debug);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("state machine failed to start: {e:#}");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    tracing::info!(config = %args.config.display(), "starting state machine");

    let config = fsm_config::load_config(&args.config)?;

    let mut options = EngineOptions::new()
        .db_path(args.db_path)
        .namespace(SocketNamespace::new(args.socket_prefix));
    if let Some(machine_name) = args.machine_name {
        options = options.machine_name(machine_name);
    }
    if let Some(text) = args.initial_context {
        options = options.initial_context(parse_initial_context(&text)?);
    }

    let mut engine = Engine::new(config, options)?;
    let handle = engine.shutdown_handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("shutdown signal received");
        handle.stop();
    });

    engine.run().await?;
    Ok(())
}

fn parse_initial_context(text: &str) -> anyhow::Result<fsm_core::Map> {
    let value: serde_json::Value =
        serde_json::from_str(text).context("invalid --initial-context JSON")?;
    match value {
        serde_json::Value::Object(map) => Ok(map),
        _ => anyhow::bail!("--initial-context must be a JSON object"),
    }
}

/// Resolve on SIGINT or SIGTERM.
async fn shutdown_signal() {
    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = term.recv() => {}
            }
        }
        Err(_) => {
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
