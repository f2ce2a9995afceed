//! Loose numeric coercion for snapshot values.

use serde_json::Value;

/// Coerce a JSON value to a number the way a loose numeric cast does.
///
/// Strings are trimmed and parsed (empty is 0), booleans are 1/0, null is 0,
/// arrays and objects are NaN. Callers filter with [`f64::is_finite`].
pub fn number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse().unwrap_or(f64::NAN)
            }
        }
        Value::Bool(true) => 1.0,
        Value::Bool(false) | Value::Null => 0.0,
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

/// The coerced value of a present field, if it is finite.
pub fn finite(value: Option<&Value>) -> Option<f64> {
    value.map(number).filter(|n| n.is_finite())
}

/// Parse a percentage such as `"85%"` or `"72.5 %"` into a fraction.
pub fn percentage(value: Option<&Value>) -> Option<f64> {
    let raw = match value? {
        Value::String(s) => s.trim().trim_end_matches('%').trim_end().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    raw.parse::<f64>().ok().map(|p| p / 100.0).filter(|f| f.is_finite())
}
