// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line arguments.

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "statemachine",
    version,
    about = "Run a YAML-defined state machine process"
)]
pub struct Args {
    /// Path to the YAML machine definition
    pub config: PathBuf,

    /// Override metadata.machine_name from the definition
    #[arg(long)]
    pub machine_name: Option<String>,

    /// Verbose logging
    #[arg(long)]
    pub debug: bool,

    /// Seed the context map with a JSON object (used by start_fsm to
    /// pass parent-derived variables)
    #[arg(long)]
    pub initial_context: Option<String>,

    /// SQLite store location; the containing directory is created
    #[arg(long, default_value = fsm_store::DEFAULT_DB_PATH)]
    pub db_path: PathBuf,

    /// Socket namespace prefix, so multiple runtimes coexist per host
    #[arg(long, default_value = fsm_core::paths::DEFAULT_PREFIX)]
    pub socket_prefix: String,
}

#[cfg(test)]
#[path = "args_tests.rs"]
mod tests;
