// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Template variable interpolation.
//!
//! Placeholders are `{name}` or `{nested.path.name}`. Lookups walk the
//! context tree; a template that is exactly one placeholder substitutes
//! the original value with its type intact, so actions can forward lists
//! and maps through config. Anything mixed with literal text stringifies.
//! Missing paths leave the placeholder literal — a `{foo}` surviving into
//! a log line means `foo` was absent.

use crate::context::{render, Context};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Placeholder pattern: first segment starts with a letter or underscore,
/// segments contain `[A-Za-z0-9_]` joined by dots.
// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([a-zA-Z_][a-zA-Z0-9_.]*)\}").expect("constant regex pattern is valid")
});

/// Interpolate a single string template against the context.
///
/// Returns the looked-up value unchanged (list, number, map, …) when the
/// template is exactly one placeholder; otherwise returns a string with
/// each resolvable placeholder stringified in place.
pub fn interpolate_str(template: &str, context: &Context) -> Value {
    // Whole-template placeholder: preserve the original type
    if let Some(caps) = PLACEHOLDER.captures(template) {
        let whole = caps.get(0).map(|m| (m.start(), m.end())) == Some((0, template.len()));
        if whole {
            return match lookup(context, &caps[1]) {
                Some(value) => value.clone(),
                None => Value::String(template.to_string()),
            };
        }
    }

    let replaced = PLACEHOLDER.replace_all(template, |caps: &regex::Captures| {
        match lookup(context, &caps[1]) {
            Some(value) => render(value),
            None => caps[0].to_string(),
        }
    });
    Value::String(replaced.into_owned())
}

/// Interpolate any value: strings go through [`interpolate_str`],
/// everything else passes through unchanged.
pub fn interpolate_value(template: &Value, context: &Context) -> Value {
    match template {
        Value::String(s) => interpolate_str(s, context),
        other => other.clone(),
    }
}

/// Recursively interpolate a configuration tree.
///
/// Maps and lists are rebuilt with string leaves interpolated; non-string
/// scalars pass through untouched. The engine runs this on every action
/// config before the action sees it.
pub fn interpolate_config(config: &Value, context: &Context) -> Value {
    match config {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), interpolate_config(v, context)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| interpolate_config(item, context))
                .collect(),
        ),
        Value::String(s) => interpolate_str(s, context),
        other => other.clone(),
    }
}

/// Walk a dot-separated path through the context tree.
///
/// Every intermediate step must be a map with the key present and
/// non-null; otherwise the lookup fails and the caller keeps the
/// placeholder literal.
fn lookup<'a>(context: &'a Context, path: &str) -> Option<&'a Value> {
    context.get_path(path)
}

#[cfg(test)]
#[path = "interp_tests.rs"]
mod tests;
