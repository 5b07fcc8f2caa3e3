//! Tolerant accessors over `serde_json::Value`.

use serde_json::{Map, Value};

use super::{FormatTag, NormalizeError};

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Top-level object or a [`NormalizeError::WrongShape`].
pub(crate) fn expect_object(
    format: FormatTag,
    value: &Value,
) -> Result<&Map<String, Value>, NormalizeError> {
    value.as_object().ok_or(NormalizeError::WrongShape {
        format,
        expected: "object",
        found: kind_of(value),
    })
}

/// Items of the first array found under `keys`, or of `value` itself if it
/// is an array. Missing lists yield no items.
pub(crate) fn list_under<'a>(
    format: FormatTag,
    value: &'a Value,
    keys: &[&str],
) -> Result<Vec<&'a Map<String, Value>>, NormalizeError> {
    let items = match value {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => keys
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        other => {
            return Err(NormalizeError::WrongShape {
                format,
                expected: "object or array",
                found: kind_of(other),
            })
        }
    };
    Ok(items.iter().filter_map(Value::as_object).collect())
}

/// Trimmed, non-empty string under the first present key.
pub(crate) fn text(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match map.get(*key)? {
        Value::String(value) => {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_owned())
        }
        _ => None,
    })
}

/// Identifier under `keys`, accepting strings and integers.
pub(crate) fn identifier(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match map.get(*key)? {
        Value::String(value) if !value.trim().is_empty() => Some(value.trim().to_owned()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}

/// Whole minutes from a number or numeric string; negatives and garbage are 0.
pub(crate) fn minutes(value: Option<&Value>) -> u32 {
    let raw = match value {
        Some(Value::Number(number)) => number.as_f64().unwrap_or(0.0),
        Some(Value::String(text)) => text
            .split_whitespace()
            .next()
            .and_then(|head| head.parse::<f64>().ok())
            .unwrap_or(0.0),
        _ => 0.0,
    };
    if raw.is_finite() && raw > 0.0 {
        raw.round().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

/// Boolean flag; absent or mistyped is `false`.
pub(crate) fn flag(map: &Map<String, Value>, key: &str) -> bool {
    match map.get(key) {
        Some(Value::Bool(value)) => *value,
        Some(Value::String(value)) => value.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Strings of an array, skipping blanks and non-strings.
pub(crate) fn strings(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}
