// ABOUTME: Tolerant field extraction from raw provider JSON payloads
// ABOUTME: Unparseable numerics become None, never zero; ids must be numeric-like
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FleetSync Contributors

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

/// Look up a possibly-dotted path inside a JSON object
///
/// `"current_location.lat"` descends through nested objects; a plain key is
/// a single-step lookup. Returns `None` if any step is missing or not an
/// object.
#[must_use]
pub fn lookup<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = record;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

/// Extract an optional float, tolerating numeric strings
///
/// Provider payloads carry numbers both as JSON numbers and as strings.
/// Anything unparseable maps to `None`; a missing reading is never
/// fabricated as zero.
#[must_use]
pub fn opt_f64(record: &Value, path: &str) -> Option<f64> {
    match lookup(record, path)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Extract an optional integer, tolerating numeric strings and whole floats
#[must_use]
pub fn opt_i64(record: &Value, path: &str) -> Option<i64> {
    match lookup(record, path)? {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.is_finite())
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Extract an optional boolean, tolerating "true"/"false" strings
#[must_use]
pub fn opt_bool(record: &Value, path: &str) -> Option<bool> {
    match lookup(record, path)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Extract an optional non-empty string
#[must_use]
pub fn opt_string(record: &Value, path: &str) -> Option<String> {
    match lookup(record, path)? {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First float found across an ordered list of candidate paths
#[must_use]
pub fn first_f64(record: &Value, paths: &[&str]) -> Option<f64> {
    paths.iter().find_map(|p| opt_f64(record, p))
}

/// First boolean found across an ordered list of candidate paths
#[must_use]
pub fn first_bool(record: &Value, paths: &[&str]) -> Option<bool> {
    paths.iter().find_map(|p| opt_bool(record, p))
}

/// First string found across an ordered list of candidate paths
#[must_use]
pub fn first_string(record: &Value, paths: &[&str]) -> Option<String> {
    paths.iter().find_map(|p| opt_string(record, p))
}

/// Resolve the native vehicle id from ordered candidate paths
///
/// An id counts only if it is a JSON number or a string made entirely of
/// digits; free-form labels in id-ish fields do not qualify.
#[must_use]
pub fn native_id(record: &Value, paths: &[&str]) -> Option<String> {
    for path in paths {
        match lookup(record, path) {
            Some(Value::Number(n)) => return Some(n.to_string()),
            Some(Value::String(s)) => {
                let trimmed = s.trim();
                if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
                    return Some(trimmed.to_owned());
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse a timestamp value that may be RFC 3339 text or an epoch number
///
/// Epoch values above `100_000_000_000` are treated as milliseconds; the
/// threshold is far past any plausible epoch-seconds fix time.
#[must_use]
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
                return Some(dt.with_timezone(&Utc));
            }
            trimmed.parse::<i64>().ok().and_then(epoch_to_datetime)
        }
        Value::Number(n) => n.as_i64().and_then(epoch_to_datetime),
        _ => None,
    }
}

fn epoch_to_datetime(n: i64) -> Option<DateTime<Utc>> {
    if n > 100_000_000_000 {
        Utc.timestamp_millis_opt(n).single()
    } else {
        Utc.timestamp_opt(n, 0).single()
    }
}

/// Resolve the fix timestamp from ordered candidate paths
///
/// Falls back to the ingestion time when no candidate parses, so a location
/// row always carries a usable `located_at`.
#[must_use]
pub fn resolve_timestamp(record: &Value, paths: &[&str]) -> DateTime<Utc> {
    paths
        .iter()
        .filter_map(|p| lookup(record, p))
        .find_map(parse_timestamp)
        .unwrap_or_else(Utc::now)
}
