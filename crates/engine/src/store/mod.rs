//! Storage adapter over the embedded SQLite database.
//!
//! [`KakeboStore`] owns the single open connection and exposes CRUD for
//! transactions and monthly budgets. Every operation returns a
//! [`StoreResult`]: driver failures, validation failures and missing records
//! all come back as a [`StoreError`] and nothing panics across this boundary.

use chrono::NaiveDate;
use migration::{Migrator, MigratorTrait, SchemaManager};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectOptions, Database, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use tokio::sync::RwLock;

use crate::{MonthlyBudget, Transaction, budgets, meta, transactions, util};

pub use config::DatabaseConfig;
pub use error::{StoreError, StoreResult};
use error::StoreContext;

mod config;
mod error;
mod password;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($db:expr, $context:literal, |$tx:ident| $body:expr) => {{
        let $tx = $db.begin().await.context($context)?;
        let result: StoreResult<_> = $body;
        match result {
            Ok(value) => {
                $tx.commit().await.context($context)?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

#[derive(Debug, Default)]
pub struct KakeboStore {
    connection: RwLock<Option<DatabaseConnection>>,
}

impl KakeboStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens (or creates) the database described by `config`.
    ///
    /// Any previously open handle is closed first, so a failed connect leaves
    /// the store disconnected. Writable connections bring the schema up to
    /// date; read-only connections require an existing file and never write.
    pub async fn connect(&self, config: &DatabaseConfig) -> StoreResult<()> {
        self.disconnect().await;

        if config.read_only && !tokio::fs::try_exists(&config.path).await.unwrap_or(false) {
            return Err(StoreError::Connection(format!(
                "database file not found: {}",
                config.path.display()
            )));
        }

        let mut options = ConnectOptions::new(config.url());
        options.max_connections(1).sqlx_logging(false);
        let db = Database::connect(options)
            .await
            .map_err(|err| StoreError::Connection(err.to_string()))?;

        if let Err(err) = open_checked(&db, config).await {
            close_quietly(db).await;
            return Err(err);
        }

        *self.connection.write().await = Some(db);
        tracing::info!(
            "connected to {} (read_only={})",
            config.path.display(),
            config.read_only
        );
        Ok(())
    }

    /// Closes the open handle, if any.
    pub async fn disconnect(&self) {
        if let Some(db) = self.connection.write().await.take() {
            close_quietly(db).await;
            tracing::debug!("database connection closed");
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.connection.read().await.is_some()
    }

    /// Smoke check: counts the stored transactions.
    pub async fn test_connection(&self) -> StoreResult<u64> {
        let db = self.db().await?;
        let count = transactions::Entity::find()
            .count(&db)
            .await
            .map_err(|err| StoreError::Connection(err.to_string()))?;
        tracing::debug!("connection test ok: {count} transactions");
        Ok(count)
    }

    // ── Transactions ────────────────────────────────────────────────────────

    pub async fn add_transaction(&self, tx: &Transaction) -> StoreResult<Transaction> {
        ensure_valid(util::transaction_violations(tx))?;
        let db = self.db().await?;

        let mut active = transactions::ActiveModel::from(tx);
        active.id = ActiveValue::NotSet;
        let model = active
            .insert(&db)
            .await
            .context("Failed to add transaction")?;
        tracing::debug!("transaction {} added", model.id);
        to_transaction(model)
    }

    /// Full replace of an existing transaction.
    pub async fn update_transaction(&self, tx: &Transaction) -> StoreResult<Transaction> {
        let id = tx.id.ok_or_else(|| {
            StoreError::Validation("Transaction ID is required for update".to_string())
        })?;
        ensure_valid(util::transaction_violations(tx))?;
        let db = self.db().await?;

        let model = with_tx!(db, "Failed to update transaction", |db_tx| {
            transactions::Entity::find_by_id(id)
                .one(&db_tx)
                .await
                .context("Failed to update transaction")?
                .ok_or_else(|| not_found_transaction(id))?;
            transactions::ActiveModel::from(tx)
                .update(&db_tx)
                .await
                .context("Failed to update transaction")
        })?;
        tracing::debug!("transaction {id} updated");
        to_transaction(model)
    }

    pub async fn delete_transaction(&self, id: i32) -> StoreResult<()> {
        let db = self.db().await?;
        let result = transactions::Entity::delete_by_id(id)
            .exec(&db)
            .await
            .context("Failed to delete transaction")?;
        if result.rows_affected == 0 {
            return Err(not_found_transaction(id));
        }
        tracing::debug!("transaction {id} deleted");
        Ok(())
    }

    pub async fn get_transaction_by_id(&self, id: i32) -> StoreResult<Option<Transaction>> {
        let db = self.db().await?;
        transactions::Entity::find_by_id(id)
            .one(&db)
            .await
            .context("Failed to get transaction")?
            .map(to_transaction)
            .transpose()
    }

    /// Every transaction, newest first.
    pub async fn get_all_transactions(&self) -> StoreResult<Vec<Transaction>> {
        let db = self.db().await?;
        let models = transactions::Entity::find()
            .order_by_desc(transactions::Column::Date)
            .order_by_desc(transactions::Column::Id)
            .all(&db)
            .await
            .context("Failed to get transactions")?;
        models.into_iter().map(to_transaction).collect()
    }

    /// Transactions dated in `[from, to]`, newest first.
    pub async fn get_transactions_by_date_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<Transaction>> {
        let db = self.db().await?;
        let models = transactions::Entity::find()
            .filter(transactions::Column::Date.between(from, to))
            .order_by_desc(transactions::Column::Date)
            .order_by_desc(transactions::Column::Id)
            .all(&db)
            .await
            .context("Failed to get transactions by date range")?;
        models.into_iter().map(to_transaction).collect()
    }

    // ── Budgets ─────────────────────────────────────────────────────────────

    pub async fn get_monthly_budget(
        &self,
        year: i32,
        month: u32,
    ) -> StoreResult<Option<MonthlyBudget>> {
        let db = self.db().await?;
        let model = budgets::Entity::find()
            .filter(budgets::Column::Year.eq(year))
            .filter(budgets::Column::Month.eq(month as i32))
            .one(&db)
            .await
            .context("Failed to get monthly budget")?;
        model.map(to_budget).transpose()
    }

    /// Upserts a budget.
    ///
    /// With an identity the matching row is replaced. Without one, the row for
    /// the same `(year, month)` is replaced when it exists (keeping its
    /// identity and creation time), otherwise a new row is inserted.
    pub async fn save_monthly_budget(&self, budget: &MonthlyBudget) -> StoreResult<MonthlyBudget> {
        ensure_valid(util::budget_violations(budget))?;
        let db = self.db().await?;

        let model = with_tx!(db, "Failed to save monthly budget", |db_tx| {
            let existing = match budget.id {
                Some(id) => Some(
                    budgets::Entity::find_by_id(id)
                        .one(&db_tx)
                        .await
                        .context("Failed to save monthly budget")?
                        .ok_or_else(|| {
                            StoreError::NotFound(format!("Budget with ID {id} not found"))
                        })?,
                ),
                None => budgets::Entity::find()
                    .filter(budgets::Column::Year.eq(budget.year))
                    .filter(budgets::Column::Month.eq(budget.month as i32))
                    .one(&db_tx)
                    .await
                    .context("Failed to save monthly budget")?,
            };

            match existing {
                Some(row) => {
                    let mut record = budget.clone();
                    record.id = Some(row.id);
                    if budget.id.is_none() {
                        record.created_at = row.created_at;
                    }
                    budgets::ActiveModel::from(&record)
                        .update(&db_tx)
                        .await
                        .context("Failed to save monthly budget")
                }
                None => budgets::ActiveModel::from(budget)
                    .insert(&db_tx)
                    .await
                    .context("Failed to save monthly budget"),
            }
        })?;
        tracing::debug!(
            "budget {}-{:02} saved (id {})",
            model.year,
            model.month,
            model.id
        );
        to_budget(model)
    }

    /// Every budget, latest month first.
    pub async fn get_all_budgets(&self) -> StoreResult<Vec<MonthlyBudget>> {
        let db = self.db().await?;
        let models = budgets::Entity::find()
            .order_by_desc(budgets::Column::Year)
            .order_by_desc(budgets::Column::Month)
            .all(&db)
            .await
            .context("Failed to get budgets")?;
        models.into_iter().map(to_budget).collect()
    }

    async fn db(&self) -> StoreResult<DatabaseConnection> {
        self.connection
            .read()
            .await
            .clone()
            .ok_or(StoreError::NotConnected)
    }
}

/// Checks the password, then migrates, then enrolls a first password.
///
/// A wrong password is rejected before anything is written to the file.
async fn open_checked(db: &DatabaseConnection, config: &DatabaseConfig) -> StoreResult<()> {
    let stored = stored_verifier(db).await?;
    let supplied = config.password.as_deref().filter(|p| !p.is_empty());

    match (&stored, supplied) {
        (Some(verifier), Some(given)) if !password::verify(verifier, given) => {
            tracing::warn!("rejected connection to {}: wrong password", config.path.display());
            return Err(StoreError::Connection("invalid password".to_string()));
        }
        (Some(_), None) => {
            return Err(StoreError::Connection(
                "database is password protected".to_string(),
            ));
        }
        _ => {}
    }

    if config.read_only {
        return Ok(());
    }

    Migrator::up(db, None)
        .await
        .map_err(|err| StoreError::Connection(err.to_string()))?;

    if let (None, Some(given)) = (stored, supplied) {
        meta::ActiveModel {
            key: ActiveValue::Set(meta::PASSWORD_VERIFIER_KEY.to_string()),
            value: ActiveValue::Set(password::make_verifier(given)),
        }
        .insert(db)
        .await
        .map_err(|err| StoreError::Connection(err.to_string()))?;
        tracing::info!("password set for {}", config.path.display());
    }
    Ok(())
}

/// The stored verifier; `None` for a file without the metadata table yet.
async fn stored_verifier(db: &DatabaseConnection) -> StoreResult<Option<String>> {
    let has_meta = SchemaManager::new(db)
        .has_table(meta::TABLE_NAME)
        .await
        .map_err(|err| StoreError::Connection(err.to_string()))?;
    if !has_meta {
        return Ok(None);
    }
    let row = meta::Entity::find_by_id(meta::PASSWORD_VERIFIER_KEY.to_string())
        .one(db)
        .await
        .map_err(|err| StoreError::Connection(err.to_string()))?;
    Ok(row.map(|row| row.value))
}

async fn close_quietly(db: DatabaseConnection) {
    if let Err(err) = db.close().await {
        tracing::warn!("failed to close database: {err}");
    }
}

fn ensure_valid(violations: Vec<String>) -> StoreResult<()> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(StoreError::validation(&violations))
    }
}

fn not_found_transaction(id: i32) -> StoreError {
    StoreError::NotFound(format!("Transaction with ID {id} not found"))
}

fn to_transaction(model: transactions::Model) -> StoreResult<Transaction> {
    let id = model.id;
    Transaction::try_from(model)
        .map_err(|err| StoreError::Corrupt(format!("transaction {id}: {err}")))
}

fn to_budget(model: budgets::Model) -> StoreResult<MonthlyBudget> {
    let id = model.id;
    MonthlyBudget::try_from(model).map_err(|err| StoreError::Corrupt(format!("budget {id}: {err}")))
}
