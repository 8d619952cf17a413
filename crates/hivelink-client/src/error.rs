use hivelink_common::error::CommonError;
use hivelink_driver::error::DriverError;
use hivelink_sql::error::SqlError;
use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server could not be reached or refused the session.
    #[error("connection error: {0}")]
    Connection(String),
    /// The server rejected or failed the statement.
    #[error("statement execution error: {message}")]
    StatementExecution {
        message: String,
        sql_state: Option<String>,
        error_code: Option<i32>,
    },
    /// The statement could not be built from the given input.
    #[error("invalid spec: {0}")]
    InvalidSpec(String),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl ClientError {
    pub fn protocol(message: impl Into<String>) -> Self {
        ClientError::Protocol(message.into())
    }

    /// Classifies a failure to open a connection. Every such failure is a connection error.
    pub(crate) fn from_connect(error: DriverError) -> Self {
        match error {
            DriverError::Connection(message) => ClientError::Connection(message),
            e => ClientError::Connection(e.to_string()),
        }
    }
}

impl From<DriverError> for ClientError {
    fn from(error: DriverError) -> Self {
        match error {
            DriverError::Connection(message) => ClientError::Connection(message),
            DriverError::Execution {
                message,
                sql_state,
                error_code,
            } => ClientError::StatementExecution {
                message,
                sql_state,
                error_code,
            },
            e if e.is_protocol_violation() => ClientError::Protocol(e.to_string()),
            e => ClientError::StatementExecution {
                message: e.to_string(),
                sql_state: None,
                error_code: None,
            },
        }
    }
}

impl From<SqlError> for ClientError {
    fn from(error: SqlError) -> Self {
        match error {
            SqlError::InvalidSpec(message) => ClientError::InvalidSpec(message),
        }
    }
}

impl From<CommonError> for ClientError {
    fn from(error: CommonError) -> Self {
        ClientError::Config(error.to_string())
    }
}
