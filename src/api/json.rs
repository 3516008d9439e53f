use serde_json::{Map, Value};

use crate::error::Result;

/// Re-serialize an API response as 2-space indented JSON with keys sorted at every level.
pub fn to_sorted_json(value: &Value) -> Result<String> {
    Ok(serde_json::to_string_pretty(&sort_keys(value))?)
}

// serde_json's map ordering depends on crate features, so build objects in sorted order explicitly
fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let sorted: Map<String, Value> = entries
                .into_iter()
                .map(|(key, value)| (key.clone(), sort_keys(value)))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}
