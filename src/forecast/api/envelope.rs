// src/forecast/api/envelope.rs
//! Tolerant decoding of backend payloads. Unknown shapes fall back to empty
//! data instead of failing the whole refresh.

use bevy::log::warn;
use serde_json::Value;

use crate::forecast::definitions::{ForecastRow, PermissionConfig};

fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Rows from a bare array or `{ "data": [...] }`. Non-object entries are
/// skipped.
pub fn decode_rows(value: Value) -> Vec<ForecastRow> {
    match unwrap_data(value) {
        Value::Array(items) => {
            let total = items.len();
            let rows: Vec<ForecastRow> = items.into_iter().filter_map(ForecastRow::from_value).collect();
            if rows.len() != total {
                warn!("Decode: skipped {} non-object row(s).", total - rows.len());
            }
            rows
        }
        Value::Null => Vec::new(),
        other => {
            warn!("Decode: expected a row array, got {}.", type_name(&other));
            Vec::new()
        }
    }
}

/// Permission flags from a bare object, `{ "data": {...} }` or
/// `{ "data": [{...}] }`. Anything else denies both actions.
pub fn decode_permission(value: Value) -> PermissionConfig {
    let inner = match unwrap_data(value) {
        Value::Array(mut items) if !items.is_empty() => items.swap_remove(0),
        other => other,
    };
    match inner {
        Value::Object(_) => serde_json::from_value(inner).unwrap_or_else(|e| {
            warn!("Decode: unreadable permission flags: {}", e);
            PermissionConfig::default()
        }),
        other => {
            warn!("Decode: expected permission object, got {}.", type_name(&other));
            PermissionConfig::default()
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
