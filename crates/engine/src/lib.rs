//! Kakebo budgeting engine.
//!
//! Transactions are recorded in an embedded SQLite database and every expense
//! falls into one of the four Kakebo buckets (survival, optional, culture,
//! unexpected). The crate is layered:
//!
//! - domain types and the category classifier ([`Category`], [`Money`],
//!   [`Transaction`], [`MonthlyBudget`])
//! - the storage adapter [`KakeboStore`], which reports every failure as a
//!   [`StoreError`] value
//! - the services ([`TransactionService`], [`BudgetService`],
//!   [`DatabaseService`]), which turn those failures into [`EngineError`]s
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use engine::{BudgetService, DatabaseConfig, DatabaseService, KakeboStore, TransactionService};
//!
//! # async fn run() -> Result<(), engine::EngineError> {
//! let store = Arc::new(KakeboStore::new());
//! let database = DatabaseService::new(store.clone());
//! database.connect(DatabaseConfig::new("kakebo.db")).await?;
//!
//! let transactions = TransactionService::new(store.clone());
//! let budgets = BudgetService::new(store, transactions.clone());
//! let overview = budgets.budget_overview(2024, 5).await?;
//! # Ok(())
//! # }
//! ```

pub use budgets::MonthlyBudget;
pub use categories::{
    Category, KakeboCategory, Locale, TransactionType, categories_in, default_category,
    expense_categories, income_categories,
};
pub use error::EngineError;
pub use money::Money;
pub use platform::{Platform, default_data_dir};
pub use reports::{
    BalanceInfo, BucketStatus, BudgetOverview, ExpenseByCategory, ExpenseBySubcategory,
    MonthlyExpenses,
};
pub use services::{BudgetService, DatabaseService, TransactionService};
pub use store::{DatabaseConfig, KakeboStore, StoreError, StoreResult};
pub use transactions::Transaction;

pub mod months;

mod budgets;
mod categories;
mod error;
mod meta;
mod money;
mod platform;
mod reports;
mod services;
mod store;
mod transactions;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
