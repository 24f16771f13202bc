//! Query-string flattening for `GET` endpoints

use super::ApiError;
use serde::Serialize;
use serde_json::Value;

/// Serialize a parameter record into ordered query-string pairs.
///
/// Arrays become repeated keys (`statusFilter=a&statusFilter=b`) and `null`
/// fields are dropped. Nested objects are sent as compact JSON.
pub fn to_query_pairs<Q: Serialize>(query: &Q) -> Result<Vec<(String, String)>, ApiError> {
    let value = serde_json::to_value(query).map_err(|e| ApiError::Encode(e.to_string()))?;

    let map = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Object(map) => map,
        other => {
            return Err(ApiError::Encode(format!(
                "query parameters must be a record, got {}",
                other
            )));
        }
    };

    let mut pairs = Vec::with_capacity(map.len());
    for (key, value) in map {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    if let Some(s) = scalar(&item) {
                        pairs.push((key.clone(), s));
                    }
                }
            }
            other => {
                if let Some(s) = scalar(&other) {
                    pairs.push((key, s));
                }
            }
        }
    }

    Ok(pairs)
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}
