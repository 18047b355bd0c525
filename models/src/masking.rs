//! Log-safe copies of configuration payloads.

use serde_json::Value;

/// Replacement text for masked values.
pub const MASK: &str = "******";

/// Config keys whose values never reach a log line.
pub const SENSITIVE_FIELDS: [&str; 3] = ["DSN", "apiKey", "password"];

/// Return a copy of `value` with every sensitive key masked, at any depth.
pub fn mask_sensitive(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, inner)| {
                    let masked = if SENSITIVE_FIELDS.contains(&key.as_str()) {
                        Value::String(MASK.to_string())
                    } else {
                        mask_sensitive(inner)
                    };
                    (key.clone(), masked)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(mask_sensitive).collect()),
        other => other.clone(),
    }
}
