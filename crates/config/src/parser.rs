// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Definition loading.

use crate::types::FsmConfig;
use crate::validate::validate;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from loading or validating a machine definition. All of these
/// are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found or unreadable: {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("initial_state '{0}' is not in the states list")]
    UnknownInitialState(String),

    #[error("transition {context} references undeclared state '{state}'")]
    UndeclaredState { state: String, context: String },

    #[error("invalid timed event '{0}' (expected timeout(<seconds>))")]
    InvalidTimeout(String),

    #[error("action {index} for state '{state}' has no 'type' key")]
    MissingActionType { state: String, index: usize },
}

/// Load and validate a machine definition from a YAML file.
pub fn load_config(path: impl AsRef<Path>) -> Result<FsmConfig, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&text)
}

/// Parse and validate a definition from YAML text.
pub fn parse_config(text: &str) -> Result<FsmConfig, ConfigError> {
    let config: FsmConfig = serde_yaml::from_str(text)?;
    validate(&config)?;
    Ok(config)
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
