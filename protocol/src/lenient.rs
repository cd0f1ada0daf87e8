//! Tolerant decoders for backend JSON.
//!
//! The backend is inconsistent about scalar types: ids arrive as numbers or as
//! numeric strings, and flags as booleans, `0`/`1`, or strings. Missing or
//! unreadable values fall back to zero/false rather than failing the payload.

use serde::Deserialize;
use serde::Deserializer;
use serde_json::Value;

pub(crate) fn int_from_value(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse::<i64>().unwrap_or(0),
        Value::Bool(b) => i64::from(*b),
        _ => 0,
    }
}

pub(crate) fn bool_from_value(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "y" | "t" | "yes" | "1"
        ),
        _ => false,
    }
}

pub(crate) fn int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(int_from_value(&value))
}

pub(crate) fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(bool_from_value(&value))
}

/// `active` is true only for the integer 1 (or boolean true).
pub(crate) fn active<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match &value {
        Value::Bool(b) => *b,
        other => int_from_value(other) == 1,
    })
}

pub(crate) fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}
