use std::collections::VecDeque;
use std::thread;

use hivelink_common::config::{ConnectionConfig, ExecutionConfig};
use log::{debug, trace, warn};
use secrecy::ExposeSecret;

use crate::api::{ColumnDesc, Connection, Connector, Cursor, Statement, Value};
use crate::error::{DriverError, DriverResult};
use crate::hive::rpc::TcliClient;
use crate::hive::tcli::{
    OperationState, TCloseSessionReq, TExecuteStatementReq, TOpenSessionReq, TOperationHandle,
    TSessionHandle, TStatus, CLIENT_PROTOCOL_VERSION, STATUS_STILL_EXECUTING, STATUS_SUCCESS,
    STATUS_SUCCESS_WITH_INFO,
};
use crate::hive::transport::open_client;

/// The session configuration key that selects the current database.
const USE_DATABASE_KEY: &str = "use:database";

/// Opens a HiveServer2 session per connection.
#[derive(Debug)]
pub struct HiveConnector {
    config: ConnectionConfig,
    execution: ExecutionConfig,
}

impl HiveConnector {
    pub fn new(config: ConnectionConfig, execution: ExecutionConfig) -> Self {
        Self { config, execution }
    }
}

impl Connector for HiveConnector {
    fn connect(&self) -> DriverResult<Box<dyn Connection>> {
        let connection = HiveConnection::open(&self.config, self.execution.clone())?;
        Ok(Box::new(connection))
    }
}

/// A socket with an open HiveServer2 session.
pub struct HiveConnection {
    client: TcliClient,
    session: Option<TSessionHandle>,
    execution: ExecutionConfig,
}

impl HiveConnection {
    pub fn open(config: &ConnectionConfig, execution: ExecutionConfig) -> DriverResult<Self> {
        let address = config.address();
        let mut client = open_client(config)?;
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
        let request = TOpenSessionReq {
            client_protocol: CLIENT_PROTOCOL_VERSION,
            username: non_empty(&config.user),
            password: non_empty(config.password.expose_secret()),
            configuration: vec![(USE_DATABASE_KEY.to_string(), config.database.clone())],
        };
        let session_error = |e: String| {
            DriverError::connection(format!("failed to open session on {address}: {e}"))
        };
        let response = client
            .open_session(&request)
            .map_err(|e| session_error(e.to_string()))?;
        check_status(response.status).map_err(|e| session_error(e.to_string()))?;
        let session = response
            .session_handle
            .ok_or_else(|| DriverError::protocol("OpenSession returned no session handle"))?;
        debug!(
            "opened session {} on {address} with protocol version {}",
            session.session_id.display_guid(),
            response.server_protocol_version
        );
        Ok(Self {
            client,
            session: Some(session),
            execution,
        })
    }
}

impl Connection for HiveConnection {
    fn create_statement(&mut self) -> DriverResult<Box<dyn Statement + '_>> {
        let session = self
            .session
            .clone()
            .ok_or_else(|| DriverError::connection("the connection is closed"))?;
        Ok(Box::new(HiveStatement {
            client: &mut self.client,
            session,
            execution: &self.execution,
            operation: None,
        }))
    }

    fn close(&mut self) -> DriverResult<()> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };
        debug!("closing session {}", session.session_id.display_guid());
        let response = self.client.close_session(&TCloseSessionReq {
            session_handle: session,
        })?;
        check_status(response.status)
    }
}

impl Drop for HiveConnection {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("failed to close session: {e}");
        }
    }
}

struct HiveStatement<'a> {
    client: &'a mut TcliClient,
    session: TSessionHandle,
    execution: &'a ExecutionConfig,
    /// The handle of the last operation, until it is closed.
    operation: Option<TOperationHandle>,
}

impl HiveStatement<'_> {
    /// Submits the statement and waits until the server has finished running it.
    fn run(&mut self, sql: &str) -> DriverResult<TOperationHandle> {
        self.close_operation()?;
        let request = TExecuteStatementReq {
            session_handle: self.session.clone(),
            statement: sql.to_string(),
            run_async: true,
            query_timeout: self
                .execution
                .query_timeout_secs
                .map(|s| i64::try_from(s).unwrap_or(i64::MAX)),
        };
        let response = self.client.execute_statement(&request)?;
        check_status(response.status)?;
        let handle = response
            .operation_handle
            .ok_or_else(|| DriverError::protocol("ExecuteStatement returned no operation handle"))?;
        debug!(
            "started operation {}: {sql}",
            handle.operation_id.display_guid()
        );
        self.operation = Some(handle.clone());
        self.wait_for_completion(&handle)?;
        Ok(handle)
    }

    fn wait_for_completion(&mut self, handle: &TOperationHandle) -> DriverResult<()> {
        loop {
            let response = self.client.get_operation_status(handle)?;
            check_status(response.status)?;
            let state = response
                .operation_state
                .ok_or_else(|| DriverError::protocol("GetOperationStatus returned no state"))?;
            trace!(
                "operation {} is in state {state:?}",
                handle.operation_id.display_guid()
            );
            match state {
                OperationState::Finished => return Ok(()),
                OperationState::Initialized | OperationState::Pending | OperationState::Running => {
                    thread::sleep(self.execution.poll_interval());
                }
                OperationState::Error => {
                    return Err(DriverError::Execution {
                        message: response
                            .error_message
                            .unwrap_or_else(|| "the query failed".to_string()),
                        sql_state: response.sql_state,
                        error_code: response.error_code,
                    })
                }
                OperationState::Canceled => {
                    return Err(DriverError::execution("the query was canceled"))
                }
                OperationState::Closed => {
                    return Err(DriverError::execution("the query was closed"))
                }
                OperationState::TimedOut => {
                    return Err(DriverError::execution("the query timed out"))
                }
                OperationState::Unknown => {
                    return Err(DriverError::protocol("the query is in an unknown state"))
                }
            }
        }
    }

    fn close_operation(&mut self) -> DriverResult<()> {
        let Some(handle) = self.operation.take() else {
            return Ok(());
        };
        debug!("closing operation {}", handle.operation_id.display_guid());
        let response = self.client.close_operation(&handle)?;
        check_status(response.status)
    }
}

impl Statement for HiveStatement<'_> {
    fn execute(&mut self, sql: &str) -> DriverResult<()> {
        self.run(sql)?;
        Ok(())
    }

    fn execute_query(&mut self, sql: &str) -> DriverResult<Box<dyn Cursor + '_>> {
        let handle = self.run(sql)?;
        if !handle.has_result_set {
            return Err(DriverError::execution(format!(
                "the statement returned no result set: {sql}"
            )));
        }
        let metadata = self.client.get_result_set_metadata(&handle)?;
        check_status(metadata.status)?;
        let columns = metadata
            .columns
            .ok_or_else(|| DriverError::protocol("GetResultSetMetadata returned no schema"))?
            .into_iter()
            .map(|c| {
                let position = usize::try_from(c.position).unwrap_or_default();
                ColumnDesc::new(c.column_name, position, c.type_name)
            })
            .collect();
        let fetch_size = i64::try_from(self.execution.fetch_size.max(1)).unwrap_or(i64::MAX);
        Ok(Box::new(HiveCursor {
            client: &mut *self.client,
            handle,
            columns,
            fetch_size,
            buffer: VecDeque::new(),
            exhausted: false,
        }))
    }

    fn close(&mut self) -> DriverResult<()> {
        self.close_operation()
    }
}

impl Drop for HiveStatement<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.close_operation() {
            warn!("failed to close operation: {e}");
        }
    }
}

/// Fetches rows in batches until the server returns an empty batch.
struct HiveCursor<'a> {
    client: &'a mut TcliClient,
    handle: TOperationHandle,
    columns: Vec<ColumnDesc>,
    fetch_size: i64,
    buffer: VecDeque<Vec<Value>>,
    exhausted: bool,
}

impl HiveCursor<'_> {
    fn fetch(&mut self) -> DriverResult<()> {
        let response = self.client.fetch_results(&self.handle, self.fetch_size)?;
        check_status(response.status)?;
        let rows = response.results.map(|r| r.rows).unwrap_or_default();
        trace!(
            "fetched {} rows for operation {}",
            rows.len(),
            self.handle.operation_id.display_guid()
        );
        if rows.is_empty() {
            self.exhausted = true;
        }
        if let Some(row) = rows.iter().find(|r| r.len() != self.columns.len()) {
            return Err(DriverError::protocol(format!(
                "received a row of {} values for {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.buffer.extend(rows);
        Ok(())
    }
}

impl Cursor for HiveCursor<'_> {
    fn columns(&self) -> &[ColumnDesc] {
        &self.columns
    }

    fn next_row(&mut self) -> DriverResult<Option<Vec<Value>>> {
        loop {
            if let Some(row) = self.buffer.pop_front() {
                return Ok(Some(row));
            }
            if self.exhausted {
                return Ok(None);
            }
            self.fetch()?;
        }
    }

    fn close(&mut self) -> DriverResult<()> {
        self.buffer.clear();
        self.exhausted = true;
        Ok(())
    }
}

fn check_status(status: TStatus) -> DriverResult<()> {
    match status.status_code {
        STATUS_SUCCESS | STATUS_STILL_EXECUTING => Ok(()),
        STATUS_SUCCESS_WITH_INFO => {
            for message in &status.info_messages {
                debug!("server info: {message}");
            }
            Ok(())
        }
        code => Err(DriverError::Execution {
            message: status
                .error_message
                .unwrap_or_else(|| format!("the server returned status code {code}")),
            sql_state: status.sql_state,
            error_code: status.error_code,
        }),
    }
}
