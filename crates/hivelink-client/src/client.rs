use std::sync::Arc;

use hivelink_common::config::{AppConfig, StatementConfig};
use hivelink_driver::api::{Connector, Statement, Value};
use hivelink_driver::error::DriverResult;
use hivelink_driver::hive::HiveConnector;
use hivelink_sql::bind::bind_parameters;
use hivelink_sql::builder::{build_add_partition, build_create_table_from_spec, build_load_data};
use hivelink_sql::spec::{PartitionSpec, TableSpec};
use hivelink_sql::validate::{
    validate_literal, validate_partition_literals, validate_partition_names, validate_table_name,
    validate_table_spec,
};
use log::{info, warn};

use crate::error::{ClientError, ClientResult};
use crate::materialize::{materialize, Row};

/// Runs statements against a warehouse, one connection per call.
///
/// Every call releases its cursor, statement, and connection in that order
/// before it returns, whether it succeeds or not.
#[derive(Clone)]
pub struct HiveClient {
    connector: Arc<dyn Connector>,
    statement: StatementConfig,
}

impl HiveClient {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            statement: StatementConfig::default(),
        }
    }

    /// Creates a client that connects to HiveServer2 as configured.
    pub fn from_config(config: AppConfig) -> Self {
        let AppConfig {
            connection,
            execution,
            statement,
        } = config;
        let connector = HiveConnector::new(connection, execution);
        Self::new(Arc::new(connector)).with_statement_config(statement)
    }

    pub fn with_statement_config(mut self, config: StatementConfig) -> Self {
        self.statement = config;
        self
    }

    pub fn create_partitioned_table(&self, spec: &TableSpec) -> ClientResult<()> {
        let sql = self.create_table_statement(spec)?;
        self.execute(&sql)
    }

    pub fn add_partition(&self, table_name: &str, partition: &PartitionSpec) -> ClientResult<()> {
        let sql = self.add_partition_statement(table_name, partition)?;
        self.execute(&sql)
    }

    /// Loads a file into a partition. With `local`, the path is read from the
    /// file system of the server process instead of the distributed file system.
    pub fn load_data(
        &self,
        table_name: &str,
        local: bool,
        file_path: &str,
        partition: &PartitionSpec,
    ) -> ClientResult<()> {
        let sql = self.load_data_statement(table_name, local, file_path, partition)?;
        self.execute(&sql)
    }

    /// Checks the table definition as configured and builds the `CREATE TABLE` statement.
    pub fn create_table_statement(&self, spec: &TableSpec) -> ClientResult<String> {
        if self.statement.validate_names {
            validate_table_spec(spec)?;
        }
        Ok(build_create_table_from_spec(spec)?)
    }

    pub fn add_partition_statement(
        &self,
        table_name: &str,
        partition: &PartitionSpec,
    ) -> ClientResult<String> {
        self.check_partition(table_name, partition)?;
        Ok(build_add_partition(table_name, partition)?)
    }

    pub fn load_data_statement(
        &self,
        table_name: &str,
        local: bool,
        file_path: &str,
        partition: &PartitionSpec,
    ) -> ClientResult<String> {
        self.check_partition(table_name, partition)?;
        if self.statement.reject_unsafe_literals {
            validate_literal(file_path)?;
        }
        Ok(build_load_data(table_name, local, file_path, partition)?)
    }

    /// Binds `params` to the `?` placeholders of `sql` and returns all result rows.
    pub fn execute_query(&self, sql: &str, params: &[Value]) -> ClientResult<Vec<Row>> {
        let sql = bind_parameters(sql, params)?;
        info!("executing query: {sql}");
        let rows = self.with_statement(|statement| {
            let mut cursor = statement.execute_query(&sql)?;
            let rows = materialize(cursor.as_mut());
            release("cursor", cursor.close());
            rows
        })?;
        info!("query returned {} rows", rows.len());
        Ok(rows)
    }

    /// Executes a statement that returns no rows.
    pub fn execute(&self, sql: &str) -> ClientResult<()> {
        info!("executing statement: {sql}");
        self.with_statement(|statement| Ok(statement.execute(sql)?))
    }

    fn check_partition(&self, table_name: &str, partition: &PartitionSpec) -> ClientResult<()> {
        if self.statement.validate_names {
            validate_table_name(table_name)?;
            validate_partition_names(partition)?;
        }
        if self.statement.reject_unsafe_literals {
            validate_partition_literals(partition)?;
        }
        Ok(())
    }

    /// Runs `f` with a fresh statement on a fresh connection and releases both.
    /// A failure to release is logged and does not change the result.
    fn with_statement<T, F>(&self, f: F) -> ClientResult<T>
    where
        F: FnOnce(&mut dyn Statement) -> ClientResult<T>,
    {
        let mut connection = self
            .connector
            .connect()
            .map_err(ClientError::from_connect)?;
        let result = match connection.create_statement() {
            Ok(mut statement) => {
                let result = f(statement.as_mut());
                release("statement", statement.close());
                result
            }
            Err(e) => Err(e.into()),
        };
        release("connection", connection.close());
        result
    }
}

fn release(resource: &str, result: DriverResult<()>) {
    if let Err(e) = result {
        warn!("failed to close {resource}: {e}");
    }
}
