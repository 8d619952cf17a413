//! The interface between statement execution and a database driver.
//!
//! A [`Statement`] borrows its [`Connection`] and a [`Cursor`] borrows its
//! [`Statement`], so a handle can never outlive the handle it was created from.
//! Dropping a handle that was not closed releases it on a best-effort basis.

pub use hivelink_common::value::Value;

use crate::error::DriverResult;

/// Opens connections to a server.
pub trait Connector: Send + Sync {
    fn connect(&self) -> DriverResult<Box<dyn Connection>>;
}

pub trait Connection {
    fn create_statement(&mut self) -> DriverResult<Box<dyn Statement + '_>>;

    /// Closes the connection. Closing an already closed connection is a no-op.
    fn close(&mut self) -> DriverResult<()>;
}

pub trait Statement {
    /// Executes a statement that does not return rows.
    fn execute(&mut self, sql: &str) -> DriverResult<()>;

    /// Executes a query and returns a cursor over its rows.
    fn execute_query(&mut self, sql: &str) -> DriverResult<Box<dyn Cursor + '_>>;

    /// Closes the statement. Closing an already closed statement is a no-op.
    fn close(&mut self) -> DriverResult<()>;
}

pub trait Cursor {
    /// The columns of the result, in result order.
    fn columns(&self) -> &[ColumnDesc];

    /// Advances the cursor. Returns `None` once all rows have been read.
    /// Each row has one value per column, in column order.
    fn next_row(&mut self) -> DriverResult<Option<Vec<Value>>>;

    fn close(&mut self) -> DriverResult<()>;
}

/// A result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDesc {
    /// The column label, e.g. `jt.dt`.
    pub name: String,
    /// The one-based ordinal position of the column.
    pub position: usize,
    /// The server type name, e.g. `STRING` or `ARRAY`.
    pub type_name: String,
}

impl ColumnDesc {
    pub fn new(name: impl Into<String>, position: usize, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position,
            type_name: type_name.into(),
        }
    }
}
