// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Action type registry.
//!
//! Compile-time replacement for the filesystem discovery the reference
//! runtime used: each action type is registered under its tag in a
//! process-wide table. Later registrations shadow earlier ones, which is
//! how embedders override built-ins, and a small alias table maps legacy
//! tags to current ones.

use crate::action::{Action, ActionError};
use fsm_core::Map;
use std::collections::HashMap;
use thiserror::Error;

/// Factory constructing an action instance from its interpolated config.
pub type ActionFactory = Box<dyn Fn(&Map) -> Result<Box<dyn Action>, ActionError> + Send + Sync>;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown action type '{0}'")]
    Unknown(String),

    #[error(transparent)]
    Action(#[from] ActionError),
}

/// Maps action type tags to factories.
pub struct ActionRegistry {
    factories: HashMap<String, ActionFactory>,
    aliases: HashMap<String, String>,
}

impl ActionRegistry {
    /// An empty registry with the standard alias table.
    pub fn empty() -> Self {
        let mut aliases = HashMap::new();
        aliases.insert("activity_log".to_string(), "log".to_string());
        Self {
            factories: HashMap::new(),
            aliases,
        }
    }

    /// The built-in action pack.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        crate::actions::register_builtin(&mut registry);
        registry
    }

    /// Register (or shadow) a factory for a type tag.
    pub fn register<F>(&mut self, tag: impl Into<String>, factory: F)
    where
        F: Fn(&Map) -> Result<Box<dyn Action>, ActionError> + Send + Sync + 'static,
    {
        self.factories.insert(tag.into(), Box::new(factory));
    }

    /// Map a legacy tag onto a registered one.
    pub fn alias(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.aliases.insert(from.into(), to.into());
    }

    pub fn contains(&self, tag: &str) -> bool {
        let resolved = self.resolve(tag);
        self.factories.contains_key(resolved)
    }

    pub fn available(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    /// Construct an action for a tag, following aliases.
    pub fn create(&self, tag: &str, config: &Map) -> Result<Box<dyn Action>, RegistryError> {
        let resolved = self.resolve(tag);
        match self.factories.get(resolved) {
            Some(factory) => Ok(factory(config)?),
            None => Err(RegistryError::Unknown(tag.to_string())),
        }
    }

    fn resolve<'a>(&'a self, tag: &'a str) -> &'a str {
        self.aliases.get(tag).map(String::as_str).unwrap_or(tag)
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
