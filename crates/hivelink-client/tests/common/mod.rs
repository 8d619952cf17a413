//! An in-memory driver that records every call it receives.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use hivelink_client::HiveClient;
use hivelink_driver::api::{ColumnDesc, Connection, Connector, Cursor, Statement, Value};
use hivelink_driver::error::{DriverError, DriverResult};

/// How the fake server responds.
#[derive(Debug, Clone, Default)]
pub struct Script {
    /// Column labels of every query result.
    pub labels: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub refuse_connections: bool,
    /// Statements containing this text fail.
    pub failing_statement: Option<String>,
    /// Every close call fails.
    pub failing_close: bool,
}

#[derive(Debug)]
struct FakeState {
    script: Script,
    events: Mutex<Vec<String>>,
}

/// A handle to the fake server. Clones share the script and the recorded calls.
#[derive(Debug, Clone)]
pub struct FakeConnector {
    state: Arc<FakeState>,
}

impl FakeConnector {
    pub fn new(script: Script) -> Self {
        Self {
            state: Arc::new(FakeState {
                script,
                events: Mutex::new(vec![]),
            }),
        }
    }

    pub fn events(&self) -> Vec<String> {
        self.state.events.lock().unwrap().clone()
    }

    fn script(&self) -> &Script {
        &self.state.script
    }

    fn record(&self, event: impl Into<String>) {
        self.state.events.lock().unwrap().push(event.into());
    }

    fn close_result(&self, event: &str) -> DriverResult<()> {
        self.record(event);
        if self.script().failing_close {
            Err(DriverError::connection("broken pipe"))
        } else {
            Ok(())
        }
    }

    fn check_statement(&self, sql: &str) -> DriverResult<()> {
        match &self.script().failing_statement {
            Some(text) if sql.contains(text.as_str()) => Err(DriverError::Execution {
                message: format!("Error while compiling statement: {sql}"),
                sql_state: Some("42000".to_string()),
                error_code: Some(40000),
            }),
            _ => Ok(()),
        }
    }
}

impl Connector for FakeConnector {
    fn connect(&self) -> DriverResult<Box<dyn Connection>> {
        self.record("connect");
        if self.script().refuse_connections {
            return Err(DriverError::connection("Connection refused"));
        }
        Ok(Box::new(FakeConnection {
            connector: self.clone(),
        }))
    }
}

struct FakeConnection {
    connector: FakeConnector,
}

impl Connection for FakeConnection {
    fn create_statement(&mut self) -> DriverResult<Box<dyn Statement + '_>> {
        self.connector.record("create statement");
        Ok(Box::new(FakeStatement {
            connector: &self.connector,
        }))
    }

    fn close(&mut self) -> DriverResult<()> {
        self.connector.close_result("close connection")
    }
}

struct FakeStatement<'a> {
    connector: &'a FakeConnector,
}

impl Statement for FakeStatement<'_> {
    fn execute(&mut self, sql: &str) -> DriverResult<()> {
        self.connector.record(format!("execute {sql}"));
        self.connector.check_statement(sql)
    }

    fn execute_query(&mut self, sql: &str) -> DriverResult<Box<dyn Cursor + '_>> {
        self.connector.record(format!("query {sql}"));
        self.connector.check_statement(sql)?;
        let script = self.connector.script();
        Ok(Box::new(FakeCursor {
            connector: self.connector,
            columns: script
                .labels
                .iter()
                .enumerate()
                .map(|(n, label)| ColumnDesc::new(label.as_str(), n + 1, "STRING"))
                .collect(),
            rows: script.rows.iter().cloned().collect(),
        }))
    }

    fn close(&mut self) -> DriverResult<()> {
        self.connector.close_result("close statement")
    }
}

struct FakeCursor<'a> {
    connector: &'a FakeConnector,
    columns: Vec<ColumnDesc>,
    rows: VecDeque<Vec<Value>>,
}

impl Cursor for FakeCursor<'_> {
    fn columns(&self) -> &[ColumnDesc] {
        &self.columns
    }

    fn next_row(&mut self) -> DriverResult<Option<Vec<Value>>> {
        Ok(self.rows.pop_front())
    }

    fn close(&mut self) -> DriverResult<()> {
        self.connector.close_result("close cursor")
    }
}

/// Returns a client over a fake server running `script`, and the server.
pub fn fake_client(script: Script) -> (HiveClient, FakeConnector) {
    let connector = FakeConnector::new(script);
    let client = HiveClient::new(Arc::new(connector.clone()));
    (client, connector)
}

/// The access log rows used throughout the tests.
#[allow(dead_code)]
pub fn access_log_script() -> Script {
    Script {
        labels: vec!["jt.dt".to_string(), "jt.ip".to_string(), "jt.code".to_string()],
        rows: vec![
            vec![Value::from("20150605"), Value::from("10.0.0.1"), Value::Int(200)],
            vec![Value::from("20150605"), Value::from("10.0.0.2"), Value::Int(404)],
            vec![Value::from("20150605"), Value::Null, Value::Int(500)],
        ],
        ..Default::default()
    }
}
