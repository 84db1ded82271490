//! The module contains the errors the services can raise.
//!
//! The errors are:
//!
//! - [`InvalidArgument`] raised when a caller passes a value outside the
//!   domain (an income category asked for its Kakebo bucket, month 13, an
//!   unknown category code).
//! - [`Store`] raised when the storage adapter returned an error; the service
//!   layer turns every [`StoreError`] into this fault.
//! - [`Io`] raised when preparing the filesystem for a new database fails.
//!
//!  [`InvalidArgument`]: EngineError::InvalidArgument
//!  [`Store`]: EngineError::Store
//!  [`Io`]: EngineError::Io
//!  [`StoreError`]: crate::store::StoreError
use thiserror::Error;

use crate::store::StoreError;

/// Engine custom errors.
#[derive(Error, Debug, PartialEq)]
pub enum EngineError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Database error: {0}")]
    Store(#[from] StoreError),
    #[error("IO error: {0}")]
    Io(String),
}
