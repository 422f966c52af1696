// ABOUTME: Tolerant unwrapping of provider response envelopes into record arrays
// ABOUTME: Tries named fields, then a nested data field, then a bare array; else empty
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FleetSync Contributors

use serde_json::Value;
use tracing::warn;

/// Pull the record array out of a provider response body
///
/// Lookup order: each named field in `field_names`, then a top-level `data`
/// field, then the body itself if it is already an array. An unrecognized
/// shape yields an empty set with a warning rather than an error, so one
/// odd page cannot fail a whole sync.
#[must_use]
pub fn extract_records(body: &Value, field_names: &[&str]) -> Vec<Value> {
    for name in field_names {
        if let Some(Value::Array(items)) = body.get(name) {
            return items.clone();
        }
    }

    if let Some(Value::Array(items)) = body.get("data") {
        return items.clone();
    }

    if let Value::Array(items) = body {
        return items.clone();
    }

    warn!(
        fields = ?field_names,
        observed = %describe_shape(body),
        "Unrecognized provider response envelope; treating page as empty"
    );
    Vec::new()
}

/// Compact description of a body's shape for envelope diagnostics
fn describe_shape(body: &Value) -> String {
    match body {
        Value::Object(map) => {
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            format!("object with keys [{}]", keys.join(", "))
        }
        Value::Array(items) => format!("array of {} items", items.len()),
        Value::String(_) => "string".to_owned(),
        Value::Number(_) => "number".to_owned(),
        Value::Bool(_) => "boolean".to_owned(),
        Value::Null => "null".to_owned(),
    }
}
