//! Services layered on top of [`KakeboStore`](crate::KakeboStore).
//!
//! The store reports failures as values; the services turn every
//! [`StoreError`] into an [`EngineError`] so callers can simply use `?`.

use crate::{EngineError, ResultEngine, StoreError};

pub use budgets::BudgetService;
pub use database::DatabaseService;
pub use transactions::TransactionService;

mod budgets;
mod database;
mod transactions;

/// Converts a store result into an engine result, logging the failure.
fn fault<T>(operation: &str, result: Result<T, StoreError>) -> ResultEngine<T> {
    result.map_err(|err| {
        tracing::warn!("{operation} failed: {err}");
        EngineError::Store(err)
    })
}
