//! Parsers for command-line values.

use hivelink_client::Value;

/// Parses a `name:type` column definition. The type may itself contain colons,
/// e.g. `attrs:struct<a:int>`.
pub fn parse_column(s: &str) -> Result<(String, String), String> {
    match s.split_once(':') {
        Some((name, data_type)) if !name.trim().is_empty() && !data_type.trim().is_empty() => {
            Ok((name.trim().to_string(), data_type.trim().to_string()))
        }
        _ => Err(format!("expected NAME:TYPE, got `{s}`")),
    }
}

/// Parses a `key=value` partition entry. The value may be empty.
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got `{s}`")),
    }
}

/// Parses a query parameter as an integer, a double, a boolean, or `null`,
/// falling back to a string. A value in single quotes is always a string.
pub fn parse_param(s: &str) -> Result<Value, String> {
    if let Some(quoted) = s
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
    {
        return Ok(Value::from(quoted));
    }
    if s.eq_ignore_ascii_case("null") {
        return Ok(Value::Null);
    }
    if let Ok(v) = s.parse::<bool>() {
        return Ok(Value::Boolean(v));
    }
    if let Ok(v) = s.parse::<i32>() {
        return Ok(Value::Int(v));
    }
    if let Ok(v) = s.parse::<i64>() {
        return Ok(Value::BigInt(v));
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Value::Double(v)),
        _ => Ok(Value::from(s)),
    }
}
