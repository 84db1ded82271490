use std::sync::Arc;

use chrono::NaiveDate;

use super::fault;
use crate::{
    BalanceInfo, EngineError, ExpenseByCategory, ExpenseBySubcategory, KakeboStore, ResultEngine,
    Transaction, months, reports,
};

/// Transaction queries and aggregations.
#[derive(Clone, Debug)]
pub struct TransactionService {
    store: Arc<KakeboStore>,
}

impl TransactionService {
    pub fn new(store: Arc<KakeboStore>) -> Self {
        Self { store }
    }

    pub async fn get_all(&self) -> ResultEngine<Vec<Transaction>> {
        fault("get_all", self.store.get_all_transactions().await)
    }

    /// Transactions dated in `[from, to]`, newest first.
    pub async fn get_by_date_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ResultEngine<Vec<Transaction>> {
        fault(
            "get_by_date_range",
            self.store.get_transactions_by_date_range(from, to).await,
        )
    }

    pub async fn get_by_month(&self, year: i32, month: u32) -> ResultEngine<Vec<Transaction>> {
        let (from, to) = months::month_range(year, month)?;
        self.get_by_date_range(from, to).await
    }

    pub async fn get_expenses_by_category(
        &self,
        year: i32,
        month: u32,
    ) -> ResultEngine<Vec<ExpenseByCategory>> {
        let transactions = self.get_by_month(year, month).await?;
        reports::expenses_by_category(&transactions)
    }

    pub async fn get_expenses_by_subcategory(
        &self,
        year: i32,
        month: u32,
    ) -> ResultEngine<Vec<ExpenseBySubcategory>> {
        let transactions = self.get_by_month(year, month).await?;
        reports::expenses_by_subcategory(&transactions)
    }

    pub async fn get_balance(&self, year: i32, month: u32) -> ResultEngine<BalanceInfo> {
        let transactions = self.get_by_month(year, month).await?;
        reports::balance(&transactions)
    }

    pub async fn get_total_balance(&self) -> ResultEngine<BalanceInfo> {
        let transactions = self.get_all().await?;
        reports::balance(&transactions)
    }

    pub async fn add(&self, tx: &Transaction) -> ResultEngine<Transaction> {
        fault("add_transaction", self.store.add_transaction(tx).await)
    }

    pub async fn update(&self, tx: &Transaction) -> ResultEngine<Transaction> {
        fault("update_transaction", self.store.update_transaction(tx).await)
    }

    pub async fn delete(&self, id: i32) -> ResultEngine<()> {
        fault("delete_transaction", self.store.delete_transaction(id).await)
    }

    /// Deletes a stored transaction; one without identity was never saved.
    pub async fn delete_transaction(&self, tx: &Transaction) -> ResultEngine<()> {
        let id = tx.id.ok_or_else(|| {
            EngineError::InvalidArgument("Transaction ID is required for delete".to_string())
        })?;
        self.delete(id).await
    }

    pub async fn get_by_id(&self, id: i32) -> ResultEngine<Option<Transaction>> {
        fault("get_transaction", self.store.get_transaction_by_id(id).await)
    }
}
