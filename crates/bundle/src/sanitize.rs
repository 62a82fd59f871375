//! JSON sanitizing.

use serde::Serialize;
use serde_json::Value;
use statline_core::Result;

/// Serialize to a JSON value with every NaN or infinite number replaced by `null`.
pub fn to_sanitized_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    // Non-finite floats have no JSON number form and become Value::Null here.
    Ok(serde_json::to_value(value)?)
}

/// Whether a value tree holds only finite numbers.
pub fn is_finite(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.as_f64().map_or(true, f64::is_finite),
        Value::Array(items) => items.iter().all(is_finite),
        Value::Object(map) => map.values().all(is_finite),
        _ => true,
    }
}
