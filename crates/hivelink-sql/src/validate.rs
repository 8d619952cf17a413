use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{SqlError, SqlResult};
use crate::spec::{PartitionSpec, TableSpec};

lazy_static! {
    static ref COLUMN_NAME_REGEX: Regex = {
        #[allow(clippy::unwrap_used)]
        Regex::new(r"^([A-Za-z0-9_]+|`[^`]+`)$").unwrap()
    };
    static ref TABLE_NAME_REGEX: Regex = {
        #[allow(clippy::unwrap_used)]
        Regex::new(r"^([A-Za-z0-9_]+|`[^`]+`)(\.([A-Za-z0-9_]+|`[^`]+`))?$").unwrap()
    };
    static ref DATA_TYPE_REGEX: Regex = {
        #[allow(clippy::unwrap_used)]
        Regex::new(r"^[A-Za-z0-9_<>,: ]+$").unwrap()
    };
    static ref TYPE_PARAMETERS_REGEX: Regex = {
        #[allow(clippy::unwrap_used)]
        Regex::new(r"(?i)\b(decimal|varchar|char)\s*\(\s*\d+\s*(,\s*\d+\s*)?\)").unwrap()
    };
}

/// Accepts a table name, optionally qualified by a database name.
pub fn validate_table_name(name: &str) -> SqlResult<()> {
    if TABLE_NAME_REGEX.is_match(name) {
        Ok(())
    } else {
        Err(SqlError::invalid(format!("invalid table name: {name}")))
    }
}

/// Accepts a column or partition key name.
pub fn validate_column_name(name: &str) -> SqlResult<()> {
    if COLUMN_NAME_REGEX.is_match(name) {
        Ok(())
    } else {
        Err(SqlError::invalid(format!("invalid column name: {name}")))
    }
}

/// Accepts primitive and complex type descriptors such as `decimal(10,2)` or
/// `map<string,array<int>>`. Parentheses are only accepted as the parameters of
/// `decimal`, `varchar`, and `char`; separators only inside angle brackets.
pub fn validate_data_type(data_type: &str) -> SqlResult<()> {
    let invalid = || SqlError::invalid(format!("invalid data type: {data_type}"));
    let data_type_name = TYPE_PARAMETERS_REGEX.replace_all(data_type, "$1");
    if !DATA_TYPE_REGEX.is_match(&data_type_name) {
        return Err(invalid());
    }
    let mut depth = 0usize;
    for c in data_type_name.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.checked_sub(1).ok_or_else(invalid)?,
            ',' | ':' if depth == 0 => return Err(invalid()),
            _ => {}
        }
    }
    if depth == 0 {
        Ok(())
    } else {
        Err(invalid())
    }
}

/// Rejects values that could terminate a single-quoted literal early.
pub fn validate_literal(value: &str) -> SqlResult<()> {
    if value.contains(['\'', '\\']) {
        Err(SqlError::invalid(format!("unsafe literal value: {value}")))
    } else {
        Ok(())
    }
}

pub fn validate_table_spec(spec: &TableSpec) -> SqlResult<()> {
    validate_table_name(&spec.name)?;
    for (name, data_type) in &spec.columns {
        validate_column_name(name)?;
        validate_data_type(data_type)?;
    }
    for key in &spec.partition_keys {
        validate_column_name(key)?;
    }
    Ok(())
}

pub fn validate_partition_names(spec: &PartitionSpec) -> SqlResult<()> {
    spec.iter().try_for_each(|(key, _)| validate_column_name(key))
}

pub fn validate_partition_literals(spec: &PartitionSpec) -> SqlResult<()> {
    spec.iter().try_for_each(|(_, value)| validate_literal(value))
}
