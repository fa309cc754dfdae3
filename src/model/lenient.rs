//! Forgiving deserializers for LLM-extracted JSON.
//!
//! Extraction output is noisy: amounts arrive as numbers, as strings with
//! thousands separators and a `원` suffix, or not at all. These helpers accept
//! all of those shapes and never fail the surrounding record.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

/// Parse a won amount out of loose text such as `"490,000,000원"`.
#[must_use]
pub fn parse_won(text: &str) -> Option<u64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',' && *c != '원')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    if let Ok(value) = cleaned.parse::<u64>() {
        return Some(value);
    }
    cleaned.parse::<f64>().ok().and_then(float_to_won)
}

#[allow(clippy::cast_sign_loss)]
fn float_to_won(value: f64) -> Option<u64> {
    if value.is_finite() && value >= 0.0 {
        Some(value.round() as u64)
    } else {
        None
    }
}

fn value_to_won(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(float_to_won)),
        Value::String(s) => parse_won(s),
        _ => None,
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Won amount; anything unreadable becomes `0`.
pub fn won<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(0);
    }
    Ok(value_to_won(&value).unwrap_or_else(|| {
        warn!(value = %value, "unreadable amount, using 0");
        0
    }))
}

/// Won amount that may legitimately be absent.
pub fn optional_won<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match value_to_won(&value) {
        Some(v) => Ok(Some(v)),
        None => {
            warn!(value = %value, "unreadable amount, using 0");
            Ok(Some(0))
        }
    }
}

/// Text field that may be sent as a number (`"동": 101`).
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_string(&value).unwrap_or_default())
}

pub fn optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_string(&value).filter(|s| !s.is_empty()))
}

/// Small integer (floor, line, count) sent as a number or as text like `"29층"`.
pub fn optional_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match &value {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => last_number(s),
        _ => None,
    })
}

/// Last run of digits in `text` (`"5~9"` → 9).
#[must_use]
pub fn last_number(text: &str) -> Option<u32> {
    text.split(|c: char| !c.is_ascii_digit())
        .rfind(|part| !part.is_empty())
        .and_then(|part| part.parse().ok())
}
