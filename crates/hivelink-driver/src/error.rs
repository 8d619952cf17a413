use thiserror::Error;

pub type DriverResult<T> = Result<T, DriverError>;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("execution error: {message}")]
    Execution {
        message: String,
        sql_state: Option<String>,
        error_code: Option<i32>,
    },
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("thrift error: {0}")]
    Thrift(#[from] thrift::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DriverError {
    pub fn connection(message: impl Into<String>) -> Self {
        DriverError::Connection(message.into())
    }

    pub fn execution(message: impl Into<String>) -> Self {
        DriverError::Execution {
            message: message.into(),
            sql_state: None,
            error_code: None,
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        DriverError::Protocol(message.into())
    }

    /// Returns `true` if the server sent a message the driver could not make sense of.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            DriverError::Protocol(_)
                | DriverError::Thrift(thrift::Error::Protocol(_) | thrift::Error::Application(_))
        )
    }
}
