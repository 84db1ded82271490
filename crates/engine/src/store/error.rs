//! Errors returned by the storage adapter.

use sea_orm::DbErr;
use thiserror::Error;

/// Every adapter operation yields this instead of panicking or bubbling a
/// raw driver error.
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("No database connection")]
    NotConnected,
    #[error("Connection failed: {0}")]
    Connection(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{context}: {message}")]
    Operation {
        context: &'static str,
        message: String,
    },
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl StoreError {
    /// Builds a validation error from the list of violated rules.
    pub(crate) fn validation(violations: &[String]) -> Self {
        Self::Validation(violations.join("; "))
    }
}

/// Labels a driver error with the operation that produced it.
pub(crate) trait StoreContext<T> {
    fn context(self, context: &'static str) -> StoreResult<T>;
}

impl<T> StoreContext<T> for Result<T, DbErr> {
    fn context(self, context: &'static str) -> StoreResult<T> {
        self.map_err(|err| StoreError::Operation {
            context,
            message: err.to_string(),
        })
    }
}
