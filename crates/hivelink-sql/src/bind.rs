//! Client-side binding of positional `?` parameters.
//!
//! HiveServer2 has no server-side prepared statements, so parameters are rendered
//! as literals and substituted into the statement text in declaration order.

use hivelink_common::value::Value;

use crate::error::{SqlError, SqlResult};

/// Substitutes every `?` placeholder in `sql` with the next parameter.
///
/// Placeholders inside quoted strings and back-quoted identifiers are left alone.
/// The number of placeholders must match the number of parameters.
pub fn bind_parameters(sql: &str, params: &[Value]) -> SqlResult<String> {
    let mut bound = String::with_capacity(sql.len());
    let mut params_iter = params.iter();
    let mut placeholders = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for c in sql.chars() {
        match quote {
            Some(q) => {
                bound.push(c);
                if escaped {
                    escaped = false;
                } else if c == '\\' && q != '`' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' | '`' => {
                    quote = Some(c);
                    bound.push(c);
                }
                '?' => {
                    placeholders += 1;
                    let value = params_iter.next().ok_or_else(|| {
                        SqlError::invalid(format!("parameter #{placeholders} is not bound"))
                    })?;
                    bound.push_str(&render_literal(value)?);
                }
                _ => bound.push(c),
            },
        }
    }
    if placeholders != params.len() {
        return Err(SqlError::invalid(format!(
            "{} parameters given for {placeholders} placeholders",
            params.len()
        )));
    }
    Ok(bound)
}

/// Renders a value as a literal of the query language.
pub fn render_literal(value: &Value) -> SqlResult<String> {
    match value {
        Value::Null => Ok("NULL".to_string()),
        Value::Boolean(v) => Ok(v.to_string()),
        Value::TinyInt(v) => Ok(v.to_string()),
        Value::SmallInt(v) => Ok(v.to_string()),
        Value::Int(v) => Ok(v.to_string()),
        Value::BigInt(v) => Ok(v.to_string()),
        Value::Double(v) if v.is_finite() => Ok(format!("{v:?}")),
        Value::Double(v) => Err(SqlError::invalid(format!(
            "non-finite double parameter: {v}"
        ))),
        Value::String(v) => Ok(quote_string_literal(v)),
        Value::Binary(_) => Err(SqlError::invalid("binary parameters are not supported")),
    }
}

/// Quotes a string with single quotes, escaping backslashes and single quotes.
pub fn quote_string_literal(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        if c == '\\' || c == '\'' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('\'');
    quoted
}
