//! Test helpers: Thrift writers for server messages and an in-process HiveServer2.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::ops::Range;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use hivelink_common::config::{ConnectionConfig, TransportMode};
use thrift::protocol::{
    TBinaryInputProtocol, TBinaryOutputProtocol, TInputProtocol, TListIdentifier,
    TMessageIdentifier, TMessageType, TOutputProtocol, TType,
};
use thrift::transport::{
    TBufferedReadTransport, TBufferedWriteTransport, TFramedReadTransport, TFramedWriteTransport,
};

use crate::error::DriverError;
use crate::hive::tcli::{
    invalid_data, read_struct, write_field, write_struct, THandleIdentifier, TOperationHandle,
    TSessionHandle, WriteThrift, CLIENT_PROTOCOL_VERSION, STATUS_SUCCESS,
};
use crate::hive::transport::{
    read_sasl_message, write_sasl_message, SASL_BAD, SASL_COMPLETE, SASL_OK, SASL_START,
};

pub(crate) const OPERATION_TYPE_EXECUTE_STATEMENT: i32 = 0;
pub(crate) const STATUS_ERROR: i32 = 3;

const OPERATION_STATE_RUNNING: i32 = 1;
const OPERATION_STATE_FINISHED: i32 = 2;
const OPERATION_STATE_ERROR: i32 = 5;

#[derive(Debug, Clone)]
pub(crate) enum TestColumn {
    Strings(Vec<Option<String>>),
    Ints(Vec<Option<i32>>),
}

impl TestColumn {
    fn len(&self) -> usize {
        match self {
            TestColumn::Strings(values) => values.len(),
            TestColumn::Ints(values) => values.len(),
        }
    }

    fn slice(&self, range: Range<usize>) -> TestColumn {
        match self {
            TestColumn::Strings(values) => TestColumn::Strings(values[range].to_vec()),
            TestColumn::Ints(values) => TestColumn::Ints(values[range].to_vec()),
        }
    }

    fn type_id(&self) -> i32 {
        match self {
            TestColumn::Strings(_) => 7,
            TestColumn::Ints(_) => 3,
        }
    }
}

fn write_list<T>(
    o: &mut dyn TOutputProtocol,
    element_type: TType,
    items: &[T],
    mut write_element: impl FnMut(&mut dyn TOutputProtocol, &T) -> thrift::Result<()>,
) -> thrift::Result<()> {
    let size = i32::try_from(items.len()).map_err(|_| invalid_data("list is too long"))?;
    o.write_list_begin(&TListIdentifier::new(element_type, size))?;
    for item in items {
        write_element(&mut *o, item)?;
    }
    o.write_list_end()
}

fn null_bitmap<T>(values: &[Option<T>]) -> Vec<u8> {
    let mut bitmap = vec![0u8; values.len().div_ceil(8)];
    for (n, value) in values.iter().enumerate() {
        if value.is_none() {
            bitmap[n / 8] |= 1 << (n % 8);
        }
    }
    bitmap
}

fn write_column(o: &mut dyn TOutputProtocol, column: &TestColumn) -> thrift::Result<()> {
    write_struct(o, "TColumn", |o| match column {
        TestColumn::Strings(values) => write_field(o, "stringVal", TType::Struct, 7, |o| {
            write_struct(o, "TStringColumn", |o| {
                write_field(o, "values", TType::List, 1, |o| {
                    write_list(o, TType::String, values.as_slice(), |o, v| {
                        o.write_string(v.as_deref().unwrap_or(""))
                    })
                })?;
                write_field(o, "nulls", TType::String, 2, |o| {
                    o.write_bytes(&null_bitmap(values))
                })
            })
        }),
        TestColumn::Ints(values) => write_field(o, "i32Val", TType::Struct, 4, |o| {
            write_struct(o, "TI32Column", |o| {
                write_field(o, "values", TType::List, 1, |o| {
                    write_list(o, TType::I32, values.as_slice(), |o, v| {
                        o.write_i32(v.unwrap_or_default())
                    })
                })?;
                write_field(o, "nulls", TType::String, 2, |o| {
                    o.write_bytes(&null_bitmap(values))
                })
            })
        }),
    })
}

/// Writes a column-based `TRowSet` as sent by servers speaking protocol V6 or later.
pub(crate) fn write_column_row_set(
    o: &mut dyn TOutputProtocol,
    columns: &[TestColumn],
) -> thrift::Result<()> {
    write_struct(o, "TRowSet", |o| {
        write_field(o, "startRowOffset", TType::I64, 1, |o| o.write_i64(0))?;
        write_field(o, "rows", TType::List, 2, |o| {
            write_list::<()>(o, TType::Struct, &[], |_, _| Ok(()))
        })?;
        write_field(o, "columns", TType::List, 3, |o| {
            write_list(o, TType::Struct, columns, write_column)
        })
    })
}

/// Writes a row-based `TRowSet` of string values. A null is a `TStringValue` without a value.
pub(crate) fn write_row_based_row_set(
    o: &mut dyn TOutputProtocol,
    rows: &[Vec<Option<String>>],
) -> thrift::Result<()> {
    write_struct(o, "TRowSet", |o| {
        write_field(o, "startRowOffset", TType::I64, 1, |o| o.write_i64(0))?;
        write_field(o, "rows", TType::List, 2, |o| {
            write_list(o, TType::Struct, rows, |o, row| {
                write_struct(o, "TRow", |o| {
                    write_field(o, "colVals", TType::List, 1, |o| {
                        write_list(o, TType::Struct, row.as_slice(), |o, value| {
                            write_struct(o, "TColumnValue", |o| {
                                write_field(o, "stringVal", TType::Struct, 7, |o| {
                                    write_struct(o, "TStringValue", |o| match value {
                                        Some(v) => write_field(o, "value", TType::String, 1, |o| {
                                            o.write_string(v)
                                        }),
                                        None => Ok(()),
                                    })
                                })
                            })
                        })
                    })
                })
            })
        })
    })
}

/// Writes a `TStatus`. An error message comes with a SQL state and an error code.
pub(crate) fn write_status(
    o: &mut dyn TOutputProtocol,
    status_code: i32,
    error_message: Option<&str>,
) -> thrift::Result<()> {
    write_struct(o, "TStatus", |o| {
        write_field(o, "statusCode", TType::I32, 1, |o| o.write_i32(status_code))?;
        if let Some(message) = error_message {
            write_field(o, "sqlState", TType::String, 3, |o| o.write_string("42000"))?;
            write_field(o, "errorCode", TType::I32, 4, |o| o.write_i32(10001))?;
            write_field(o, "errorMessage", TType::String, 5, |o| {
                o.write_string(message)
            })?;
        }
        Ok(())
    })
}

/// Writes a reply message whose result struct holds `body` as field 0.
pub(crate) fn reply<F>(
    o: &mut dyn TOutputProtocol,
    method: &str,
    sequence_number: i32,
    body: F,
) -> thrift::Result<()>
where
    F: FnOnce(&mut dyn TOutputProtocol) -> thrift::Result<()>,
{
    o.write_message_begin(&TMessageIdentifier::new(
        method,
        TMessageType::Reply,
        sequence_number,
    ))?;
    write_struct(o, &format!("{method}_result"), |o| {
        write_field(o, "success", TType::Struct, 0, body)
    })?;
    o.write_message_end()?;
    o.flush()
}

#[derive(Debug, Clone)]
pub(crate) struct FakeServerOptions {
    pub transport: TransportMode,
    /// The only password accepted during the SASL handshake, if any.
    pub password: Option<String>,
    /// The result of every query, as labeled columns of equal length.
    pub columns: Vec<(String, TestColumn)>,
    /// Statements containing this text fail when submitted.
    pub compile_error: Option<String>,
    /// Statements containing this text fail while running.
    pub runtime_error: Option<String>,
    /// The number of status polls answered with `RUNNING` before the final state.
    pub running_polls: usize,
}

impl Default for FakeServerOptions {
    fn default() -> Self {
        Self {
            transport: TransportMode::Sasl,
            password: None,
            columns: vec![],
            compile_error: None,
            runtime_error: None,
            running_polls: 0,
        }
    }
}

/// A HiveServer2 stand-in that serves a single connection and records the calls it receives.
pub(crate) struct FakeServer {
    address: SocketAddr,
    transport: TransportMode,
    events: Arc<Mutex<Vec<String>>>,
    handle: JoinHandle<thrift::Result<()>>,
}

impl FakeServer {
    pub fn start(options: FakeServerOptions) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let address = listener.local_addr()?;
        let transport = options.transport;
        let events = Arc::new(Mutex::new(vec![]));
        let handle = thread::spawn({
            let events = Arc::clone(&events);
            move || -> thrift::Result<()> {
                let (stream, _) = listener.accept()?;
                serve(stream, &options, &events)
            }
        });
        Ok(Self {
            address,
            transport,
            events,
            handle,
        })
    }

    pub fn config(&self) -> ConnectionConfig {
        ConnectionConfig {
            host: self.address.ip().to_string(),
            port: self.address.port(),
            user: "tester".to_string(),
            transport: self.transport,
            ..Default::default()
        }
    }

    /// Waits for the client to disconnect and returns the recorded calls.
    pub fn finish(self) -> Vec<String> {
        self.handle
            .join()
            .expect("server thread panicked")
            .expect("server failed");
        self.events.lock().unwrap().clone()
    }
}

fn serve(
    mut stream: TcpStream,
    options: &FakeServerOptions,
    events: &Mutex<Vec<String>>,
) -> thrift::Result<()> {
    let read_half = stream.try_clone()?;
    let (mut i, mut o): (Box<dyn TInputProtocol>, Box<dyn TOutputProtocol>) =
        match options.transport {
            TransportMode::Sasl => {
                if !accept_sasl(&mut stream, options, events)? {
                    return Ok(());
                }
                (
                    Box::new(TBinaryInputProtocol::new(
                        TFramedReadTransport::new(read_half),
                        true,
                    )),
                    Box::new(TBinaryOutputProtocol::new(
                        TFramedWriteTransport::new(stream),
                        true,
                    )),
                )
            }
            TransportMode::NoSasl => (
                Box::new(TBinaryInputProtocol::new(
                    TBufferedReadTransport::new(read_half),
                    true,
                )),
                Box::new(TBinaryOutputProtocol::new(
                    TBufferedWriteTransport::new(stream),
                    true,
                )),
            ),
        };
    let mut session = FakeSession {
        options,
        events,
        operation: None,
    };
    // A failed read means the client has disconnected.
    while let Ok(message) = i.read_message_begin() {
        session.handle(i.as_mut(), o.as_mut(), &message)?;
    }
    Ok(())
}

fn accept_sasl(
    stream: &mut TcpStream,
    options: &FakeServerOptions,
    events: &Mutex<Vec<String>>,
) -> thrift::Result<bool> {
    let protocol_error = |e: DriverError| invalid_data(e.to_string());
    let (status, mechanism) = read_sasl_message(stream).map_err(protocol_error)?;
    assert_eq!((status, mechanism.as_slice()), (SASL_START, b"PLAIN".as_slice()));
    let (status, credentials) = read_sasl_message(stream).map_err(protocol_error)?;
    assert_eq!(status, SASL_OK);
    let credentials = String::from_utf8_lossy(&credentials).into_owned();
    let mut parts = credentials.split('\0').skip(1);
    let user = parts.next().unwrap_or_default().to_string();
    let password = parts.next().unwrap_or_default();
    events.lock().unwrap().push(format!("SASL {user}"));
    if options.password.as_deref().is_some_and(|p| p != password) {
        write_sasl_message(stream, SASL_BAD, b"Error validating the login")
            .map_err(protocol_error)?;
        return Ok(false);
    }
    write_sasl_message(stream, SASL_COMPLETE, b"").map_err(protocol_error)?;
    Ok(true)
}

struct FakeOperation {
    handle: TOperationHandle,
    polls: usize,
    failed: bool,
    offset: usize,
}

struct FakeSession<'a> {
    options: &'a FakeServerOptions,
    events: &'a Mutex<Vec<String>>,
    operation: Option<FakeOperation>,
}

impl FakeSession<'_> {
    fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }

    fn handle(
        &mut self,
        i: &mut dyn TInputProtocol,
        o: &mut dyn TOutputProtocol,
        message: &TMessageIdentifier,
    ) -> thrift::Result<()> {
        let method = message.name.as_str();
        let sequence_number = message.sequence_number;
        match method {
            "OpenSession" => {
                let mut configuration = vec![];
                read_request(i, |i, id, field_type| {
                    if (id, field_type) != (4, TType::Map) {
                        return Ok(false);
                    }
                    let map = i.read_map_begin()?;
                    for _ in 0..map.size {
                        let key = i.read_string()?;
                        let value = i.read_string()?;
                        configuration.push(format!("{key}={value}"));
                    }
                    i.read_map_end()?;
                    Ok(true)
                })?;
                self.record(format!("OpenSession {}", configuration.join(",")));
                let session = TSessionHandle {
                    session_id: new_handle_identifier(),
                };
                reply(o, method, sequence_number, |o| {
                    write_struct(o, "TOpenSessionResp", |o| {
                        write_field(o, "status", TType::Struct, 1, |o| {
                            write_status(o, STATUS_SUCCESS, None)
                        })?;
                        write_field(o, "serverProtocolVersion", TType::I32, 2, |o| {
                            o.write_i32(CLIENT_PROTOCOL_VERSION)
                        })?;
                        write_field(o, "sessionHandle", TType::Struct, 3, |o| session.write(o))
                    })
                })
            }
            "ExecuteStatement" => {
                let mut statement = String::new();
                read_request(i, |i, id, field_type| {
                    if (id, field_type) != (2, TType::String) {
                        return Ok(false);
                    }
                    statement = i.read_string()?;
                    Ok(true)
                })?;
                self.record(format!("ExecuteStatement {statement}"));
                let matches = |pattern: &Option<String>| {
                    pattern.as_deref().is_some_and(|p| statement.contains(p))
                };
                if matches(&self.options.compile_error) {
                    return reply(o, method, sequence_number, |o| {
                        write_struct(o, "TExecuteStatementResp", |o| {
                            write_field(o, "status", TType::Struct, 1, |o| {
                                write_status(
                                    o,
                                    STATUS_ERROR,
                                    Some(format!("Error while compiling statement: {statement}").as_str()),
                                )
                            })
                        })
                    });
                }
                let lower = statement.trim_start().to_ascii_lowercase();
                let handle = TOperationHandle {
                    operation_id: new_handle_identifier(),
                    operation_type: OPERATION_TYPE_EXECUTE_STATEMENT,
                    has_result_set: ["select", "show", "describe"]
                        .iter()
                        .any(|k| lower.starts_with(k)),
                    modified_row_count: None,
                };
                self.operation = Some(FakeOperation {
                    handle: handle.clone(),
                    polls: 0,
                    failed: matches(&self.options.runtime_error),
                    offset: 0,
                });
                reply(o, method, sequence_number, |o| {
                    write_struct(o, "TExecuteStatementResp", |o| {
                        write_field(o, "status", TType::Struct, 1, |o| {
                            write_status(o, STATUS_SUCCESS, None)
                        })?;
                        write_field(o, "operationHandle", TType::Struct, 2, |o| handle.write(o))
                    })
                })
            }
            "GetOperationStatus" => {
                skip_request(i)?;
                self.record(method.to_string());
                let running_polls = self.options.running_polls;
                let operation = self.operation.as_mut().expect("no operation");
                operation.polls += 1;
                let (state, error) = if operation.polls <= running_polls {
                    (OPERATION_STATE_RUNNING, None)
                } else if operation.failed {
                    (OPERATION_STATE_ERROR, Some("Error while processing statement"))
                } else {
                    (OPERATION_STATE_FINISHED, None)
                };
                reply(o, method, sequence_number, |o| {
                    write_struct(o, "TGetOperationStatusResp", |o| {
                        write_field(o, "status", TType::Struct, 1, |o| {
                            write_status(o, STATUS_SUCCESS, None)
                        })?;
                        write_field(o, "operationState", TType::I32, 2, |o| o.write_i32(state))?;
                        if let Some(message) = error {
                            write_field(o, "sqlState", TType::String, 3, |o| {
                                o.write_string("08S01")
                            })?;
                            write_field(o, "errorCode", TType::I32, 4, |o| o.write_i32(1))?;
                            write_field(o, "errorMessage", TType::String, 5, |o| {
                                o.write_string(message)
                            })?;
                        }
                        Ok(())
                    })
                })
            }
            "GetResultSetMetadata" => {
                skip_request(i)?;
                self.record(method.to_string());
                let columns = &self.options.columns;
                reply(o, method, sequence_number, |o| {
                    write_struct(o, "TGetResultSetMetadataResp", |o| {
                        write_field(o, "status", TType::Struct, 1, |o| {
                            write_status(o, STATUS_SUCCESS, None)
                        })?;
                        write_field(o, "schema", TType::Struct, 2, |o| {
                            write_struct(o, "TTableSchema", |o| {
                                write_field(o, "columns", TType::List, 1, |o| {
                                    let indexed = columns.iter().enumerate().collect::<Vec<_>>();
                                    write_list(o, TType::Struct, &indexed, |o, (n, (name, column))| {
                                        write_column_desc(o, name, column.type_id(), *n)
                                    })
                                })
                            })
                        })
                    })
                })
            }
            "FetchResults" => {
                let mut max_rows = 0i64;
                read_request(i, |i, id, field_type| {
                    if (id, field_type) != (3, TType::I64) {
                        return Ok(false);
                    }
                    max_rows = i.read_i64()?;
                    Ok(true)
                })?;
                self.record(method.to_string());
                let total = self.options.columns.first().map_or(0, |(_, c)| c.len());
                let operation = self.operation.as_mut().expect("no operation");
                let start = operation.offset.min(total);
                let end = (start + usize::try_from(max_rows).unwrap_or(0)).min(total);
                operation.offset = end;
                let batch = self
                    .options
                    .columns
                    .iter()
                    .map(|(_, c)| c.slice(start..end))
                    .collect::<Vec<_>>();
                reply(o, method, sequence_number, |o| {
                    write_struct(o, "TFetchResultsResp", |o| {
                        write_field(o, "status", TType::Struct, 1, |o| {
                            write_status(o, STATUS_SUCCESS, None)
                        })?;
                        write_field(o, "hasMoreRows", TType::Bool, 2, |o| o.write_bool(false))?;
                        write_field(o, "results", TType::Struct, 3, |o| {
                            write_column_row_set(o, &batch)
                        })
                    })
                })
            }
            "CloseOperation" | "CloseSession" => {
                skip_request(i)?;
                self.record(method.to_string());
                if method == "CloseOperation" {
                    let closed = self.operation.take().expect("no operation");
                    assert_eq!(closed.handle.operation_type, OPERATION_TYPE_EXECUTE_STATEMENT);
                }
                reply(o, method, sequence_number, |o| {
                    write_struct(o, "TStatusResp", |o| {
                        write_field(o, "status", TType::Struct, 1, |o| {
                            write_status(o, STATUS_SUCCESS, None)
                        })
                    })
                })
            }
            other => panic!("unexpected call: {other}"),
        }
    }
}

fn write_column_desc(
    o: &mut dyn TOutputProtocol,
    name: &str,
    type_id: i32,
    index: usize,
) -> thrift::Result<()> {
    write_struct(o, "TColumnDesc", |o| {
        write_field(o, "columnName", TType::String, 1, |o| o.write_string(name))?;
        write_field(o, "typeDesc", TType::Struct, 2, |o| {
            write_struct(o, "TTypeDesc", |o| {
                write_field(o, "types", TType::List, 1, |o| {
                    write_list(o, TType::Struct, &[type_id], |o, type_id| {
                        write_struct(o, "TTypeEntry", |o| {
                            write_field(o, "primitiveEntry", TType::Struct, 1, |o| {
                                write_struct(o, "TPrimitiveTypeEntry", |o| {
                                    write_field(o, "type", TType::I32, 1, |o| o.write_i32(*type_id))
                                })
                            })
                        })
                    })
                })
            })
        })?;
        write_field(o, "position", TType::I32, 3, |o| {
            o.write_i32(i32::try_from(index + 1).unwrap_or(i32::MAX))
        })
    })
}

/// Reads the `req` argument of a call and hands its fields to `on_field`.
fn read_request<F>(i: &mut dyn TInputProtocol, mut on_field: F) -> thrift::Result<()>
where
    F: FnMut(&mut dyn TInputProtocol, i16, TType) -> thrift::Result<bool>,
{
    read_struct(i, |i, id, field_type| {
        if (id, field_type) != (1, TType::Struct) {
            return Ok(false);
        }
        read_struct(i, &mut on_field)?;
        Ok(true)
    })?;
    i.read_message_end()
}

fn skip_request(i: &mut dyn TInputProtocol) -> thrift::Result<()> {
    read_request(i, |_, _, _| Ok(false))
}

fn new_handle_identifier() -> THandleIdentifier {
    THandleIdentifier {
        guid: uuid::Uuid::new_v4().as_bytes().to_vec(),
        secret: uuid::Uuid::new_v4().as_bytes().to_vec(),
    }
}
