// Lenient number parsing for backend payloads
//
// The backend ships the same KPI either as a JSON number or as a
// formatted string ("84.2", "52.1s"), depending on the endpoint.
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Read a number, a numeric string prefix, or fall back to zero.
pub fn value_to_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
        Value::String(s) => numeric_prefix(s).unwrap_or(0.0),
        _ => 0.0,
    }
}

pub fn value_to_u32(value: &Value) -> u32 {
    let v = value_to_f64(value);
    if v <= 0.0 {
        0
    } else if v >= u32::MAX as f64 {
        u32::MAX
    } else {
        v.round() as u32
    }
}

fn numeric_prefix(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    let end = trimmed
        .char_indices()
        .take_while(|(i, c)| c.is_ascii_digit() || *c == '.' || (*i == 0 && (*c == '-' || *c == '+')))
        .map(|(i, c)| i + c.len_utf8())
        .last()?;
    trimmed[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(value_to_f64).unwrap_or(0.0))
}

pub fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(value_to_u32).unwrap_or(0))
}
