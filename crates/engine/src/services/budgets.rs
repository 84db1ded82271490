use std::sync::Arc;

use super::{TransactionService, fault};
use crate::{
    BudgetOverview, KakeboCategory, KakeboStore, MonthlyBudget, MonthlyExpenses, ResultEngine,
    reports,
};

/// Planned-vs-actual budgeting on top of [`TransactionService`].
#[derive(Clone, Debug)]
pub struct BudgetService {
    store: Arc<KakeboStore>,
    transactions: TransactionService,
}

impl BudgetService {
    pub fn new(store: Arc<KakeboStore>, transactions: TransactionService) -> Self {
        Self {
            store,
            transactions,
        }
    }

    /// Expense sums per Kakebo bucket for the month.
    pub async fn calculate_actual_expenses(
        &self,
        year: i32,
        month: u32,
    ) -> ResultEngine<MonthlyExpenses> {
        let transactions = self.transactions.get_by_month(year, month).await?;
        reports::monthly_expenses(&transactions, year, month)
    }

    pub async fn get_monthly_budget(
        &self,
        year: i32,
        month: u32,
    ) -> ResultEngine<Option<MonthlyBudget>> {
        fault(
            "get_monthly_budget",
            self.store.get_monthly_budget(year, month).await,
        )
    }

    /// Upserts the budget for its `(year, month)`.
    pub async fn save_monthly_budget(&self, budget: &MonthlyBudget) -> ResultEngine<MonthlyBudget> {
        fault(
            "save_monthly_budget",
            self.store.save_monthly_budget(budget).await,
        )
    }

    pub async fn get_all_budgets(&self) -> ResultEngine<Vec<MonthlyBudget>> {
        fault("get_all_budgets", self.store.get_all_budgets().await)
    }

    pub async fn get_savings_rate(&self, year: i32, month: u32) -> ResultEngine<f64> {
        let balance = self.transactions.get_balance(year, month).await?;
        Ok(balance.savings_rate)
    }

    /// Whether the month's spend in `bucket` exceeds its budget. A month
    /// without a budget is never over.
    pub async fn is_over_budget(
        &self,
        year: i32,
        month: u32,
        bucket: KakeboCategory,
    ) -> ResultEngine<bool> {
        let Some(budget) = self.get_monthly_budget(year, month).await? else {
            return Ok(false);
        };
        let actual = self.calculate_actual_expenses(year, month).await?;
        Ok(actual.spent_in(bucket) > budget.budget_for(bucket))
    }

    pub async fn budget_overview(&self, year: i32, month: u32) -> ResultEngine<BudgetOverview> {
        let budget = self.get_monthly_budget(year, month).await?;
        let actual = self.calculate_actual_expenses(year, month).await?;
        Ok(reports::budget_overview(budget, actual))
    }
}
