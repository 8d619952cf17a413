//! The subset of the `TCLIService` Thrift messages used by the driver.
//!
//! Requests are only written and responses are only read. Fields the driver
//! does not use are skipped when reading and left unset when writing.

use thrift::protocol::{
    TFieldIdentifier, TInputProtocol, TMapIdentifier, TOutputProtocol, TStructIdentifier, TType,
};
use thrift::{ProtocolError, ProtocolErrorKind};

use crate::hive::row_set::RowSet;

/// `HIVE_CLI_SERVICE_PROTOCOL_V10`. The server answers with the version it supports.
pub(crate) const CLIENT_PROTOCOL_VERSION: i32 = 9;

pub(crate) const STATUS_SUCCESS: i32 = 0;
pub(crate) const STATUS_SUCCESS_WITH_INFO: i32 = 1;
pub(crate) const STATUS_STILL_EXECUTING: i32 = 2;

pub(crate) const FETCH_ORIENTATION_NEXT: i32 = 0;

pub(crate) trait WriteThrift {
    fn write(&self, o: &mut dyn TOutputProtocol) -> thrift::Result<()>;
}

pub(crate) trait ReadThrift: Sized {
    fn read(i: &mut dyn TInputProtocol) -> thrift::Result<Self>;
}

pub(crate) fn write_struct<F>(o: &mut dyn TOutputProtocol, name: &str, body: F) -> thrift::Result<()>
where
    F: FnOnce(&mut dyn TOutputProtocol) -> thrift::Result<()>,
{
    o.write_struct_begin(&TStructIdentifier::new(name))?;
    body(&mut *o)?;
    o.write_field_stop()?;
    o.write_struct_end()
}

pub(crate) fn write_field<F>(
    o: &mut dyn TOutputProtocol,
    name: &str,
    field_type: TType,
    id: i16,
    body: F,
) -> thrift::Result<()>
where
    F: FnOnce(&mut dyn TOutputProtocol) -> thrift::Result<()>,
{
    o.write_field_begin(&TFieldIdentifier::new(name, field_type, id))?;
    body(&mut *o)?;
    o.write_field_end()
}

/// Reads a struct and hands every field to `on_field`.
/// Fields for which `on_field` returns `false` are skipped.
pub(crate) fn read_struct<F>(i: &mut dyn TInputProtocol, mut on_field: F) -> thrift::Result<()>
where
    F: FnMut(&mut dyn TInputProtocol, i16, TType) -> thrift::Result<bool>,
{
    i.read_struct_begin()?;
    loop {
        let field = i.read_field_begin()?;
        if field.field_type == TType::Stop {
            break;
        }
        let consumed = match field.id {
            Some(id) => on_field(&mut *i, id, field.field_type)?,
            None => false,
        };
        if !consumed {
            skip(&mut *i, field.field_type)?;
        }
        i.read_field_end()?;
    }
    i.read_struct_end()
}

/// Nesting limit for [`skip`], matching the limit of the `thrift` crate.
const MAX_SKIP_DEPTH: u8 = 64;

/// Skips a value of the given type.
///
/// Strings are read as raw bytes because handle identifiers and binary
/// columns are not UTF-8, which `TInputProtocol::skip` requires.
pub(crate) fn skip(i: &mut dyn TInputProtocol, field_type: TType) -> thrift::Result<()> {
    skip_nested(i, field_type, MAX_SKIP_DEPTH)
}

fn skip_nested(i: &mut dyn TInputProtocol, field_type: TType, depth: u8) -> thrift::Result<()> {
    let depth = depth.checked_sub(1).ok_or_else(|| {
        thrift::Error::Protocol(ProtocolError::new(
            ProtocolErrorKind::DepthLimit,
            "nested too deeply",
        ))
    })?;
    match field_type {
        TType::Bool => i.read_bool().map(|_| ()),
        TType::I08 => i.read_i8().map(|_| ()),
        TType::I16 => i.read_i16().map(|_| ()),
        TType::I32 => i.read_i32().map(|_| ()),
        TType::I64 => i.read_i64().map(|_| ()),
        TType::Double => i.read_double().map(|_| ()),
        TType::String => i.read_bytes().map(|_| ()),
        TType::Struct => {
            i.read_struct_begin()?;
            loop {
                let field = i.read_field_begin()?;
                if field.field_type == TType::Stop {
                    break;
                }
                skip_nested(&mut *i, field.field_type, depth)?;
                i.read_field_end()?;
            }
            i.read_struct_end()
        }
        TType::List => {
            let list = i.read_list_begin()?;
            for _ in 0..list.size {
                skip_nested(&mut *i, list.element_type, depth)?;
            }
            i.read_list_end()
        }
        TType::Set => {
            let set = i.read_set_begin()?;
            for _ in 0..set.size {
                skip_nested(&mut *i, set.element_type, depth)?;
            }
            i.read_set_end()
        }
        TType::Map => {
            let map = i.read_map_begin()?;
            for _ in 0..map.size {
                if let Some(key_type) = map.key_type {
                    skip_nested(&mut *i, key_type, depth)?;
                }
                if let Some(value_type) = map.value_type {
                    skip_nested(&mut *i, value_type, depth)?;
                }
            }
            i.read_map_end()
        }
        other => Err(invalid_data(format!("cannot skip a value of type {other:?}"))),
    }
}

pub(crate) fn read_list<T, F>(i: &mut dyn TInputProtocol, mut read_element: F) -> thrift::Result<Vec<T>>
where
    F: FnMut(&mut dyn TInputProtocol) -> thrift::Result<T>,
{
    let list = i.read_list_begin()?;
    let size = usize::try_from(list.size).map_err(|_| invalid_data("negative list size"))?;
    let mut values = Vec::with_capacity(size);
    for _ in 0..size {
        values.push(read_element(&mut *i)?);
    }
    i.read_list_end()?;
    Ok(values)
}

pub(crate) fn invalid_data(message: impl Into<String>) -> thrift::Error {
    thrift::Error::Protocol(ProtocolError::new(
        ProtocolErrorKind::InvalidData,
        message.into(),
    ))
}

fn required<T>(name: &str, value: Option<T>) -> thrift::Result<T> {
    value.ok_or_else(|| invalid_data(format!("missing required field {name}")))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct THandleIdentifier {
    pub guid: Vec<u8>,
    pub secret: Vec<u8>,
}

impl THandleIdentifier {
    /// Formats the GUID for log messages.
    pub fn display_guid(&self) -> String {
        match uuid::Uuid::from_slice(&self.guid) {
            Ok(id) => id.to_string(),
            Err(_) => self.guid.iter().map(|b| format!("{b:02x}")).collect(),
        }
    }
}

impl WriteThrift for THandleIdentifier {
    fn write(&self, o: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        write_struct(o, "THandleIdentifier", |o| {
            write_field(o, "guid", TType::String, 1, |o| o.write_bytes(&self.guid))?;
            write_field(o, "secret", TType::String, 2, |o| o.write_bytes(&self.secret))
        })
    }
}

impl ReadThrift for THandleIdentifier {
    fn read(i: &mut dyn TInputProtocol) -> thrift::Result<Self> {
        let mut guid = None;
        let mut secret = None;
        read_struct(i, |i, id, field_type| {
            match (id, field_type) {
                (1, TType::String) => guid = Some(i.read_bytes()?),
                (2, TType::String) => secret = Some(i.read_bytes()?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(Self {
            guid: required("THandleIdentifier.guid", guid)?,
            secret: required("THandleIdentifier.secret", secret)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TSessionHandle {
    pub session_id: THandleIdentifier,
}

impl WriteThrift for TSessionHandle {
    fn write(&self, o: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        write_struct(o, "TSessionHandle", |o| {
            write_field(o, "sessionId", TType::Struct, 1, |o| self.session_id.write(o))
        })
    }
}

impl ReadThrift for TSessionHandle {
    fn read(i: &mut dyn TInputProtocol) -> thrift::Result<Self> {
        let mut session_id = None;
        read_struct(i, |i, id, field_type| {
            match (id, field_type) {
                (1, TType::Struct) => session_id = Some(THandleIdentifier::read(i)?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(Self {
            session_id: required("TSessionHandle.sessionId", session_id)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TOperationHandle {
    pub operation_id: THandleIdentifier,
    pub operation_type: i32,
    pub has_result_set: bool,
    pub modified_row_count: Option<f64>,
}

impl WriteThrift for TOperationHandle {
    fn write(&self, o: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        write_struct(o, "TOperationHandle", |o| {
            write_field(o, "operationId", TType::Struct, 1, |o| {
                self.operation_id.write(o)
            })?;
            write_field(o, "operationType", TType::I32, 2, |o| {
                o.write_i32(self.operation_type)
            })?;
            write_field(o, "hasResultSet", TType::Bool, 3, |o| {
                o.write_bool(self.has_result_set)
            })?;
            if let Some(count) = self.modified_row_count {
                write_field(o, "modifiedRowCount", TType::Double, 4, |o| {
                    o.write_double(count)
                })?;
            }
            Ok(())
        })
    }
}

impl ReadThrift for TOperationHandle {
    fn read(i: &mut dyn TInputProtocol) -> thrift::Result<Self> {
        let mut operation_id = None;
        let mut operation_type = None;
        let mut has_result_set = None;
        let mut modified_row_count = None;
        read_struct(i, |i, id, field_type| {
            match (id, field_type) {
                (1, TType::Struct) => operation_id = Some(THandleIdentifier::read(i)?),
                (2, TType::I32) => operation_type = Some(i.read_i32()?),
                (3, TType::Bool) => has_result_set = Some(i.read_bool()?),
                (4, TType::Double) => modified_row_count = Some(i.read_double()?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(Self {
            operation_id: required("TOperationHandle.operationId", operation_id)?,
            operation_type: required("TOperationHandle.operationType", operation_type)?,
            has_result_set: required("TOperationHandle.hasResultSet", has_result_set)?,
            modified_row_count,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct TStatus {
    pub status_code: i32,
    pub info_messages: Vec<String>,
    pub sql_state: Option<String>,
    pub error_code: Option<i32>,
    pub error_message: Option<String>,
}

impl ReadThrift for TStatus {
    fn read(i: &mut dyn TInputProtocol) -> thrift::Result<Self> {
        let mut status_code = None;
        let mut info_messages = vec![];
        let mut sql_state = None;
        let mut error_code = None;
        let mut error_message = None;
        read_struct(i, |i, id, field_type| {
            match (id, field_type) {
                (1, TType::I32) => status_code = Some(i.read_i32()?),
                (2, TType::List) => info_messages = read_list(i, |i| i.read_string())?,
                (3, TType::String) => sql_state = Some(i.read_string()?),
                (4, TType::I32) => error_code = Some(i.read_i32()?),
                (5, TType::String) => error_message = Some(i.read_string()?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(Self {
            status_code: required("TStatus.statusCode", status_code)?,
            info_messages,
            sql_state,
            error_code,
            error_message,
        })
    }
}

fn read_status(status: Option<TStatus>) -> thrift::Result<TStatus> {
    required("status", status)
}

#[derive(Debug)]
pub(crate) struct TOpenSessionReq {
    pub client_protocol: i32,
    pub username: Option<String>,
    pub password: Option<String>,
    pub configuration: Vec<(String, String)>,
}

impl WriteThrift for TOpenSessionReq {
    fn write(&self, o: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        write_struct(o, "TOpenSessionReq", |o| {
            write_field(o, "client_protocol", TType::I32, 1, |o| {
                o.write_i32(self.client_protocol)
            })?;
            if let Some(username) = &self.username {
                write_field(o, "username", TType::String, 2, |o| o.write_string(username))?;
            }
            if let Some(password) = &self.password {
                write_field(o, "password", TType::String, 3, |o| o.write_string(password))?;
            }
            if !self.configuration.is_empty() {
                let size = i32::try_from(self.configuration.len())
                    .map_err(|_| invalid_data("too many configuration entries"))?;
                write_field(o, "configuration", TType::Map, 4, |o| {
                    o.write_map_begin(&TMapIdentifier::new(TType::String, TType::String, size))?;
                    for (key, value) in &self.configuration {
                        o.write_string(key)?;
                        o.write_string(value)?;
                    }
                    o.write_map_end()
                })?;
            }
            Ok(())
        })
    }
}

#[derive(Debug)]
pub(crate) struct TOpenSessionResp {
    pub status: TStatus,
    pub server_protocol_version: i32,
    pub session_handle: Option<TSessionHandle>,
}

impl ReadThrift for TOpenSessionResp {
    fn read(i: &mut dyn TInputProtocol) -> thrift::Result<Self> {
        let mut status = None;
        let mut server_protocol_version = None;
        let mut session_handle = None;
        read_struct(i, |i, id, field_type| {
            match (id, field_type) {
                (1, TType::Struct) => status = Some(TStatus::read(i)?),
                (2, TType::I32) => server_protocol_version = Some(i.read_i32()?),
                (3, TType::Struct) => session_handle = Some(TSessionHandle::read(i)?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(Self {
            status: read_status(status)?,
            server_protocol_version: required(
                "TOpenSessionResp.serverProtocolVersion",
                server_protocol_version,
            )?,
            session_handle,
        })
    }
}

#[derive(Debug)]
pub(crate) struct TCloseSessionReq {
    pub session_handle: TSessionHandle,
}

impl WriteThrift for TCloseSessionReq {
    fn write(&self, o: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        write_struct(o, "TCloseSessionReq", |o| {
            write_field(o, "sessionHandle", TType::Struct, 1, |o| {
                self.session_handle.write(o)
            })
        })
    }
}

/// A response that only carries a status.
#[derive(Debug)]
pub(crate) struct TStatusResp {
    pub status: TStatus,
}

impl ReadThrift for TStatusResp {
    fn read(i: &mut dyn TInputProtocol) -> thrift::Result<Self> {
        let mut status = None;
        read_struct(i, |i, id, field_type| {
            match (id, field_type) {
                (1, TType::Struct) => status = Some(TStatus::read(i)?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(Self {
            status: read_status(status)?,
        })
    }
}

#[derive(Debug)]
pub(crate) struct TExecuteStatementReq {
    pub session_handle: TSessionHandle,
    pub statement: String,
    pub run_async: bool,
    pub query_timeout: Option<i64>,
}

impl WriteThrift for TExecuteStatementReq {
    fn write(&self, o: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        write_struct(o, "TExecuteStatementReq", |o| {
            write_field(o, "sessionHandle", TType::Struct, 1, |o| {
                self.session_handle.write(o)
            })?;
            write_field(o, "statement", TType::String, 2, |o| {
                o.write_string(&self.statement)
            })?;
            write_field(o, "runAsync", TType::Bool, 4, |o| o.write_bool(self.run_async))?;
            if let Some(timeout) = self.query_timeout {
                write_field(o, "queryTimeout", TType::I64, 5, |o| o.write_i64(timeout))?;
            }
            Ok(())
        })
    }
}

#[derive(Debug)]
pub(crate) struct TExecuteStatementResp {
    pub status: TStatus,
    pub operation_handle: Option<TOperationHandle>,
}

impl ReadThrift for TExecuteStatementResp {
    fn read(i: &mut dyn TInputProtocol) -> thrift::Result<Self> {
        let mut status = None;
        let mut operation_handle = None;
        read_struct(i, |i, id, field_type| {
            match (id, field_type) {
                (1, TType::Struct) => status = Some(TStatus::read(i)?),
                (2, TType::Struct) => operation_handle = Some(TOperationHandle::read(i)?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(Self {
            status: read_status(status)?,
            operation_handle,
        })
    }
}

/// A request that only carries an operation handle.
#[derive(Debug)]
pub(crate) struct TOperationReq<'a> {
    pub name: &'static str,
    pub operation_handle: &'a TOperationHandle,
}

impl WriteThrift for TOperationReq<'_> {
    fn write(&self, o: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        write_struct(o, self.name, |o| {
            write_field(o, "operationHandle", TType::Struct, 1, |o| {
                self.operation_handle.write(o)
            })
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OperationState {
    Initialized,
    Running,
    Finished,
    Canceled,
    Closed,
    Error,
    Unknown,
    Pending,
    TimedOut,
}

impl From<i32> for OperationState {
    fn from(value: i32) -> Self {
        match value {
            0 => OperationState::Initialized,
            1 => OperationState::Running,
            2 => OperationState::Finished,
            3 => OperationState::Canceled,
            4 => OperationState::Closed,
            5 => OperationState::Error,
            7 => OperationState::Pending,
            8 => OperationState::TimedOut,
            _ => OperationState::Unknown,
        }
    }
}

#[derive(Debug)]
pub(crate) struct TGetOperationStatusResp {
    pub status: TStatus,
    pub operation_state: Option<OperationState>,
    pub sql_state: Option<String>,
    pub error_code: Option<i32>,
    pub error_message: Option<String>,
}

impl ReadThrift for TGetOperationStatusResp {
    fn read(i: &mut dyn TInputProtocol) -> thrift::Result<Self> {
        let mut status = None;
        let mut operation_state = None;
        let mut sql_state = None;
        let mut error_code = None;
        let mut error_message = None;
        read_struct(i, |i, id, field_type| {
            match (id, field_type) {
                (1, TType::Struct) => status = Some(TStatus::read(i)?),
                (2, TType::I32) => operation_state = Some(OperationState::from(i.read_i32()?)),
                (3, TType::String) => sql_state = Some(i.read_string()?),
                (4, TType::I32) => error_code = Some(i.read_i32()?),
                (5, TType::String) => error_message = Some(i.read_string()?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(Self {
            status: read_status(status)?,
            operation_state,
            sql_state,
            error_code,
            error_message,
        })
    }
}

#[derive(Debug)]
pub(crate) struct TColumnDesc {
    pub column_name: String,
    pub type_name: &'static str,
    pub position: i32,
}

impl ReadThrift for TColumnDesc {
    fn read(i: &mut dyn TInputProtocol) -> thrift::Result<Self> {
        let mut column_name = None;
        let mut type_name = None;
        let mut position = None;
        read_struct(i, |i, id, field_type| {
            match (id, field_type) {
                (1, TType::String) => column_name = Some(i.read_string()?),
                (2, TType::Struct) => type_name = Some(read_type_desc(i)?),
                (3, TType::I32) => position = Some(i.read_i32()?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(Self {
            column_name: required("TColumnDesc.columnName", column_name)?,
            type_name: required("TColumnDesc.typeDesc", type_name)?,
            position: required("TColumnDesc.position", position)?,
        })
    }
}

/// Reads a `TTypeDesc` and returns the name of its outermost type.
fn read_type_desc(i: &mut dyn TInputProtocol) -> thrift::Result<&'static str> {
    let mut entries = vec![];
    read_struct(i, |i, id, field_type| {
        match (id, field_type) {
            (1, TType::List) => entries = read_list(i, read_type_entry)?,
            _ => return Ok(false),
        }
        Ok(true)
    })?;
    entries
        .into_iter()
        .next()
        .ok_or_else(|| invalid_data("empty type descriptor"))
}

/// Reads a `TTypeEntry` union.
fn read_type_entry(i: &mut dyn TInputProtocol) -> thrift::Result<&'static str> {
    let mut name = None;
    read_struct(i, |i, id, field_type| {
        match (id, field_type) {
            (1, TType::Struct) => name = Some(read_primitive_type_entry(i)?),
            (2, TType::Struct) => {
                skip(&mut *i, field_type)?;
                name = Some("ARRAY");
            }
            (3, TType::Struct) => {
                skip(&mut *i, field_type)?;
                name = Some("MAP");
            }
            (4, TType::Struct) => {
                skip(&mut *i, field_type)?;
                name = Some("STRUCT");
            }
            (5, TType::Struct) => {
                skip(&mut *i, field_type)?;
                name = Some("UNIONTYPE");
            }
            (6, TType::Struct) => {
                skip(&mut *i, field_type)?;
                name = Some("USER_DEFINED");
            }
            _ => return Ok(false),
        }
        Ok(true)
    })?;
    required("TTypeEntry", name)
}

fn read_primitive_type_entry(i: &mut dyn TInputProtocol) -> thrift::Result<&'static str> {
    let mut type_id = None;
    read_struct(i, |i, id, field_type| {
        match (id, field_type) {
            (1, TType::I32) => type_id = Some(i.read_i32()?),
            _ => return Ok(false),
        }
        Ok(true)
    })?;
    Ok(type_name(required("TPrimitiveTypeEntry.type", type_id)?))
}

/// Maps a `TTypeId` to the type name used in query results.
pub(crate) fn type_name(type_id: i32) -> &'static str {
    match type_id {
        0 => "BOOLEAN",
        1 => "TINYINT",
        2 => "SMALLINT",
        3 => "INT",
        4 => "BIGINT",
        5 => "FLOAT",
        6 => "DOUBLE",
        7 => "STRING",
        8 => "TIMESTAMP",
        9 => "BINARY",
        10 => "ARRAY",
        11 => "MAP",
        12 => "STRUCT",
        13 => "UNIONTYPE",
        14 => "USER_DEFINED",
        15 => "DECIMAL",
        16 => "VOID",
        17 => "DATE",
        18 => "VARCHAR",
        19 => "CHAR",
        20 => "INTERVAL_YEAR_MONTH",
        21 => "INTERVAL_DAY_TIME",
        22 => "TIMESTAMP WITH LOCAL TIME ZONE",
        _ => "UNKNOWN",
    }
}

#[derive(Debug)]
pub(crate) struct TGetResultSetMetadataResp {
    pub status: TStatus,
    pub columns: Option<Vec<TColumnDesc>>,
}

impl ReadThrift for TGetResultSetMetadataResp {
    fn read(i: &mut dyn TInputProtocol) -> thrift::Result<Self> {
        let mut status = None;
        let mut columns = None;
        read_struct(i, |i, id, field_type| {
            match (id, field_type) {
                (1, TType::Struct) => status = Some(TStatus::read(i)?),
                (2, TType::Struct) => columns = Some(read_table_schema(i)?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(Self {
            status: read_status(status)?,
            columns,
        })
    }
}

fn read_table_schema(i: &mut dyn TInputProtocol) -> thrift::Result<Vec<TColumnDesc>> {
    let mut columns = None;
    read_struct(i, |i, id, field_type| {
        match (id, field_type) {
            (1, TType::List) => columns = Some(read_list(i, TColumnDesc::read)?),
            _ => return Ok(false),
        }
        Ok(true)
    })?;
    required("TTableSchema.columns", columns)
}

#[derive(Debug)]
pub(crate) struct TFetchResultsReq<'a> {
    pub operation_handle: &'a TOperationHandle,
    pub orientation: i32,
    pub max_rows: i64,
}

impl WriteThrift for TFetchResultsReq<'_> {
    fn write(&self, o: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        write_struct(o, "TFetchResultsReq", |o| {
            write_field(o, "operationHandle", TType::Struct, 1, |o| {
                self.operation_handle.write(o)
            })?;
            write_field(o, "orientation", TType::I32, 2, |o| {
                o.write_i32(self.orientation)
            })?;
            write_field(o, "maxRows", TType::I64, 3, |o| o.write_i64(self.max_rows))
        })
    }
}

/// `hasMoreRows` is not read. Servers set it inconsistently, so the end of
/// the result is an empty batch.
#[derive(Debug)]
pub(crate) struct TFetchResultsResp {
    pub status: TStatus,
    pub results: Option<RowSet>,
}

impl ReadThrift for TFetchResultsResp {
    fn read(i: &mut dyn TInputProtocol) -> thrift::Result<Self> {
        let mut status = None;
        let mut results = None;
        read_struct(i, |i, id, field_type| {
            match (id, field_type) {
                (1, TType::Struct) => status = Some(TStatus::read(i)?),
                (3, TType::Struct) => results = Some(RowSet::read(i)?),
                _ => return Ok(false),
            }
            Ok(true)
        })?;
        Ok(Self {
            status: read_status(status)?,
            results,
        })
    }
}
