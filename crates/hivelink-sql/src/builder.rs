//! Builders for the DDL/DML statements issued against partitioned tables.
//!
//! Table names, column names, type descriptors, file paths, and partition values
//! are inserted into the statement text as they are. Nothing is escaped, so the
//! caller must make sure they are safe to splice into a statement
//! (see [`crate::validate`]). Partition values are always rendered as quoted
//! string literals, whatever the type of the partition column.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::error::{SqlError, SqlResult};
use crate::spec::{PartitionSpec, TableSpec};

const LIST_SEPARATOR: &str = ", ";

/// The type of every partition column created by [`build_create_table`].
const PARTITION_COLUMN_TYPE: &str = "string";

const ROW_FORMAT: &str = " ROW FORMAT DELIMITED FIELDS TERMINATED BY '|' \
    COLLECTION ITEMS TERMINATED BY '/' MAP KEYS TERMINATED BY '='";

/// Builds `CREATE TABLE <name>(<col> <type>, ...) PARTITIONED BY(<key> string, ...)`
/// followed by the delimited row format clauses.
pub fn build_create_table<S: AsRef<str>>(
    table_name: &str,
    columns: &IndexMap<String, String>,
    partition_keys: &[S],
) -> SqlResult<String> {
    require_name("table", table_name)?;
    if columns.is_empty() {
        return Err(SqlError::invalid(format!(
            "table {table_name} must have at least one column"
        )));
    }
    if partition_keys.is_empty() {
        return Err(SqlError::invalid(format!(
            "table {table_name} must have at least one partition key"
        )));
    }
    let columns = columns
        .iter()
        .map(|(name, data_type)| {
            require_name("column", name)?;
            if data_type.trim().is_empty() {
                return Err(SqlError::invalid(format!("column {name} has no type")));
            }
            Ok(format!("{name} {data_type}"))
        })
        .collect::<SqlResult<Vec<_>>>()?;
    let mut seen = HashSet::new();
    let partitions = partition_keys
        .iter()
        .map(|key| {
            let key = key.as_ref();
            require_name("partition key", key)?;
            if !seen.insert(key) {
                return Err(SqlError::invalid(format!("duplicate partition key: {key}")));
            }
            Ok(format!("{key} {PARTITION_COLUMN_TYPE}"))
        })
        .collect::<SqlResult<Vec<_>>>()?;
    Ok(format!(
        "CREATE TABLE {table_name}({}) PARTITIONED BY({}){ROW_FORMAT}",
        columns.join(LIST_SEPARATOR),
        partitions.join(LIST_SEPARATOR),
    ))
}

/// Builds the `CREATE TABLE` statement for a [`TableSpec`].
pub fn build_create_table_from_spec(spec: &TableSpec) -> SqlResult<String> {
    build_create_table(&spec.name, &spec.columns, &spec.partition_keys)
}

/// Builds `ALTER TABLE <name> ADD PARTITION(<key>='<value>', ...)`.
pub fn build_add_partition(table_name: &str, partition: &PartitionSpec) -> SqlResult<String> {
    require_name("table", table_name)?;
    Ok(format!(
        "ALTER TABLE {table_name} ADD PARTITION({})",
        render_key_value_clause(partition.as_map(), "=")?
    ))
}

/// Builds `LOAD DATA [LOCAL] INPATH '<path>' INTO TABLE <name> PARTITION(...)`.
///
/// `local` loads from the file system of the server process instead of the
/// distributed file system.
pub fn build_load_data(
    table_name: &str,
    local: bool,
    file_path: &str,
    partition: &PartitionSpec,
) -> SqlResult<String> {
    require_name("table", table_name)?;
    if file_path.is_empty() {
        return Err(SqlError::invalid("file path must not be empty"));
    }
    let local = if local { " LOCAL" } else { "" };
    Ok(format!(
        "LOAD DATA{local} INPATH '{file_path}' INTO TABLE {table_name} PARTITION({})",
        render_key_value_clause(partition.as_map(), "=")?
    ))
}

/// Renders `<key><separator>'<value>'` for every pair, joined by `", "`.
pub fn render_key_value_clause(
    pairs: &IndexMap<String, String>,
    separator: &str,
) -> SqlResult<String> {
    if pairs.is_empty() {
        return Err(SqlError::invalid("key-value clause must not be empty"));
    }
    let fragments = pairs
        .iter()
        .map(|(key, value)| {
            require_name("key", key)?;
            Ok(format!("{key}{separator}'{value}'"))
        })
        .collect::<SqlResult<Vec<_>>>()?;
    Ok(fragments.join(LIST_SEPARATOR))
}

fn require_name(kind: &str, name: &str) -> SqlResult<()> {
    if name.trim().is_empty() {
        Err(SqlError::invalid(format!("{kind} name must not be empty")))
    } else {
        Ok(())
    }
}
