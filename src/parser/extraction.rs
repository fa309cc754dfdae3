use crate::error::ExtractError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Pull the JSON body out of an LLM reply that may wrap it in a markdown
/// code fence.
#[must_use]
pub fn strip_code_fence(text: &str) -> &str {
    if let Some((_, rest)) = text.split_once("```json") {
        return rest.split("```").next().unwrap_or(rest).trim();
    }
    if let Some((_, rest)) = text.split_once("```") {
        return rest.split("```").next().unwrap_or(rest).trim();
    }
    text.trim()
}

/// Decode the array stored under `key` in an extraction reply.
///
/// A reply that is not JSON, or has no array under `key`, is a
/// [`ExtractError::MalformedPayload`] for that section only. Array elements
/// that do not fit `T` are dropped individually.
pub fn parse_section<T: DeserializeOwned>(reply: &str, key: &str) -> Result<Vec<T>, ExtractError> {
    let malformed = |message: String| ExtractError::MalformedPayload {
        section: key.to_string(),
        message,
    };

    let body = strip_code_fence(reply);
    let payload: Value = serde_json::from_str(body).map_err(|e| malformed(e.to_string()))?;

    let items = match payload {
        Value::Object(mut map) => map.remove(key),
        // Some replies skip the wrapper object entirely.
        array @ Value::Array(_) => Some(array),
        _ => None,
    };

    let Some(Value::Array(items)) = items else {
        return Err(malformed(format!("no '{key}' array in reply")));
    };

    let total = items.len();
    let records: Vec<T> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(section = key, index, error = %e, "dropping unreadable record");
                None
            }
        })
        .collect();

    tracing::debug!(section = key, total, kept = records.len(), "parsed section");
    Ok(records)
}
