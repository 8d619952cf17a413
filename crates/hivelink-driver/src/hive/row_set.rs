//! Decoding of `TRowSet`.
//!
//! Servers speaking protocol V6 or later send one `TColumn` per result column,
//! with a bitmap marking null entries. Older servers send one `TRow` per row.

use hivelink_common::value::Value;
use thrift::protocol::{TInputProtocol, TType};

use crate::hive::tcli::{invalid_data, read_list, read_struct, ReadThrift};

#[derive(Debug, Default, PartialEq)]
pub(crate) struct RowSet {
    pub rows: Vec<Vec<Value>>,
}

impl ReadThrift for RowSet {
    fn read(i: &mut dyn TInputProtocol) -> thrift::Result<Self> {
        let mut rows = vec![];
        let mut columns = None;
        let mut binary_columns = false;
        read_struct(i, |i, id, field_type| {
            match (id, field_type) {
                (2, TType::List) => rows = read_list(i, read_row)?,
                (3, TType::List) => columns = Some(read_list(i, read_column)?),
                (4, TType::String) => {
                    i.read_bytes()?;
                    binary_columns = true;
                }
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        match columns {
            Some(columns) if !columns.is_empty() => Ok(Self {
                rows: transpose(columns)?,
            }),
            _ if binary_columns && rows.is_empty() => {
                Err(invalid_data("compressed binary row sets are not supported"))
            }
            _ => Ok(Self { rows }),
        }
    }
}

fn transpose(columns: Vec<Vec<Value>>) -> thrift::Result<Vec<Vec<Value>>> {
    let row_count = columns.first().map(Vec::len).unwrap_or_default();
    if columns.iter().any(|c| c.len() != row_count) {
        return Err(invalid_data("columns of a row set differ in length"));
    }
    let mut columns = columns.into_iter().map(Vec::into_iter).collect::<Vec<_>>();
    let rows = (0..row_count)
        .map(|_| {
            columns
                .iter_mut()
                .map(|c| c.next().unwrap_or(Value::Null))
                .collect()
        })
        .collect();
    Ok(rows)
}

/// Reads a `TRow`, whose values are `TColumnValue` unions.
fn read_row(i: &mut dyn TInputProtocol) -> thrift::Result<Vec<Value>> {
    let mut values = vec![];
    read_struct(i, |i, id, field_type| {
        match (id, field_type) {
            (1, TType::List) => values = read_list(i, read_column_value)?,
            _ => return Ok(false),
        }
        Ok(true)
    })?;
    Ok(values)
}

fn read_column_value(i: &mut dyn TInputProtocol) -> thrift::Result<Value> {
    let mut value = Value::Null;
    read_struct(i, |i, id, field_type| {
        if field_type != TType::Struct {
            return Ok(false);
        }
        let read_scalar = scalar_reader(id).ok_or_else(|| {
            invalid_data(format!("unknown column value type: {id}"))
        })?;
        read_struct(i, |i, id, _| {
            if id != 1 {
                return Ok(false);
            }
            value = read_scalar(i)?;
            Ok(true)
        })?;
        Ok(true)
    })?;
    Ok(value)
}

/// Reads a `TColumn` union and applies its null bitmap.
fn read_column(i: &mut dyn TInputProtocol) -> thrift::Result<Vec<Value>> {
    let mut column = None;
    read_struct(i, |i, id, field_type| {
        if field_type != TType::Struct {
            return Ok(false);
        }
        let read_scalar = scalar_reader(id)
            .ok_or_else(|| invalid_data(format!("unknown column type: {id}")))?;
        let mut values = vec![];
        let mut nulls = vec![];
        read_struct(i, |i, id, field_type| {
            match (id, field_type) {
                (1, TType::List) => values = read_list(i, read_scalar)?,
                (2, TType::String) => nulls = i.read_bytes()?,
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        column = Some(apply_nulls(values, &nulls));
        Ok(true)
    })?;
    column.ok_or_else(|| invalid_data("empty column"))
}

type ScalarReader = fn(&mut dyn TInputProtocol) -> thrift::Result<Value>;

/// Returns the reader for the union member with the given field id.
/// The ids are shared by `TColumnValue` (1 to 7) and `TColumn` (1 to 8).
fn scalar_reader(id: i16) -> Option<ScalarReader> {
    let reader: ScalarReader = match id {
        1 => |i| Ok(Value::Boolean(i.read_bool()?)),
        2 => |i| Ok(Value::TinyInt(i.read_i8()?)),
        3 => |i| Ok(Value::SmallInt(i.read_i16()?)),
        4 => |i| Ok(Value::Int(i.read_i32()?)),
        5 => |i| Ok(Value::BigInt(i.read_i64()?)),
        6 => |i| Ok(Value::Double(i.read_double()?)),
        7 => |i| {
            let bytes = i.read_bytes()?;
            Ok(Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        },
        8 => |i| Ok(Value::Binary(i.read_bytes()?)),
        _ => return None,
    };
    Some(reader)
}

/// Bit `n % 8` of byte `n / 8` is set when entry `n` is null.
fn apply_nulls(values: Vec<Value>, nulls: &[u8]) -> Vec<Value> {
    values
        .into_iter()
        .enumerate()
        .map(|(n, value)| {
            let is_null = nulls
                .get(n / 8)
                .is_some_and(|byte| byte & (1u8 << (n % 8)) != 0);
            if is_null {
                Value::Null
            } else {
                value
            }
        })
        .collect()
}
