use thiserror::Error;

pub type SqlResult<T> = Result<T, SqlError>;

#[derive(Debug, Error)]
pub enum SqlError {
    #[error("invalid spec: {0}")]
    InvalidSpec(String),
}

impl SqlError {
    pub fn invalid(message: impl Into<String>) -> Self {
        SqlError::InvalidSpec(message.into())
    }
}
