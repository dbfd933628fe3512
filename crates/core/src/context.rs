// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The mutable per-engine context map.
//!
//! One context per engine, threaded through every action. Values are
//! arbitrary JSON trees so actions can stash and forward structured
//! payloads; the interpolator walks the same tree for `{dot.path}`
//! lookups.

use serde_json::Value;

/// Alias for the JSON object type used throughout the runtime.
pub type Map = serde_json::Map<String, Value>;

/// Database fields lifted from `current_job` to the top level during
/// propagation, ahead of the job's own `data` keys.
const JOB_DB_FIELDS: [&str; 4] = ["id", "source_job_id", "job_id", "job_type"];

/// Mutable key-value state owned by a single engine task.
#[derive(Debug, Clone, Default)]
pub struct Context {
    values: Map,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(values: Map) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &Map {
        &self.values
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Look up a dot-separated path, walking nested maps.
    ///
    /// Returns `None` when any segment is missing, null, or reached
    /// through a non-map value — the same rules the interpolator uses.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let first = parts.next()?;
        let mut current = self.values.get(first)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        if current.is_null() {
            None
        } else {
            Some(current)
        }
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Merge another map into this context, overwriting existing keys.
    pub fn merge(&mut self, other: Map) {
        for (k, v) in other {
            self.values.insert(k, v);
        }
    }

    /// The in-flight job map set by queue actions, if any.
    pub fn current_job(&self) -> Option<&Map> {
        self.values.get("current_job").and_then(Value::as_object)
    }

    /// Job ID for the in-flight job: `current_job.id`, falling back to a
    /// top-level `id` left by propagation.
    pub fn current_job_id(&self) -> Option<String> {
        let from_job = self.current_job().and_then(|job| job.get("id"));
        from_job
            .or_else(|| self.values.get("id"))
            .filter(|v| !v.is_null())
            .map(render)
    }

    /// Lift `current_job` fields to the top level for template substitution.
    ///
    /// Database fields (`id`, `source_job_id`, `job_id`, `job_type`) go
    /// first, then every non-null key of `current_job.data`, overwriting
    /// existing top-level values. Returns the propagated data keys, or
    /// `None` when no job is present.
    pub fn propagate_current_job(&mut self) -> Option<Vec<String>> {
        let job = self.current_job()?.clone();

        for field in JOB_DB_FIELDS {
            if let Some(value) = job.get(field) {
                if !value.is_null() {
                    self.values.insert(field.to_string(), value.clone());
                }
            }
        }

        let mut propagated = Vec::new();
        if let Some(data) = job.get("data").and_then(Value::as_object) {
            for (key, value) in data {
                if !value.is_null() {
                    self.values.insert(key.clone(), value.clone());
                    propagated.push(key.clone());
                }
            }
        }
        Some(propagated)
    }
}

/// Render a JSON value for string substitution: strings unquoted,
/// everything else in JSON notation.
pub fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
