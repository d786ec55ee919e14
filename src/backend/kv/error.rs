//! Store error type shared by the key-value and relational backends.

use thiserror::Error;

/// Failure talking to a backing store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or rejected the command
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored value could not be decoded
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt(message.into())
    }
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        Self::Unavailable(err.to_string())
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => Self::Corrupt(err.to_string()),
            other => Self::Unavailable(other.to_string()),
        }
    }
}
