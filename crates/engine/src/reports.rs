//! Report types and the aggregations behind them.
//!
//! The functions here work on already-loaded transactions; the services pick
//! the date range and hand the slice over.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    Category, EngineError, KakeboCategory, Money, MonthlyBudget, ResultEngine, Transaction,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpenseByCategory {
    pub category: Category,
    pub amount: Money,
    pub percentage: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpenseBySubcategory {
    pub category: Category,
    pub subcategory: Option<String>,
    pub amount: Money,
    pub percentage: f64,
}

/// Actual spend per Kakebo bucket for one month.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyExpenses {
    pub year: i32,
    pub month: u32,
    pub survival: Money,
    pub optional: Money,
    pub culture: Money,
    pub unexpected: Money,
}

impl MonthlyExpenses {
    /// Spend over all buckets (`None` on overflow).
    pub fn total(&self) -> Option<Money> {
        Money::checked_sum(KakeboCategory::ALL.map(|bucket| self.spent_in(bucket)))
    }

    pub fn spent_in(&self, bucket: KakeboCategory) -> Money {
        match bucket {
            KakeboCategory::Survival => self.survival,
            KakeboCategory::Optional => self.optional,
            KakeboCategory::Culture => self.culture,
            KakeboCategory::Unexpected => self.unexpected,
        }
    }

    fn add(&mut self, bucket: KakeboCategory, amount: Money) -> ResultEngine<()> {
        let slot = match bucket {
            KakeboCategory::Survival => &mut self.survival,
            KakeboCategory::Optional => &mut self.optional,
            KakeboCategory::Culture => &mut self.culture,
            KakeboCategory::Unexpected => &mut self.unexpected,
        };
        add_to(slot, amount)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BalanceInfo {
    pub total_income: Money,
    pub total_expenses: Money,
    pub balance: Money,
    /// Percent of income kept; `0.0` when there was no income.
    pub savings_rate: f64,
}

/// Planned vs actual for one bucket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketStatus {
    pub bucket: KakeboCategory,
    pub planned: Money,
    pub actual: Money,
    pub over_budget: bool,
}

impl BucketStatus {
    /// Budget left in the bucket (`None` on overflow).
    pub fn remaining(&self) -> Option<Money> {
        self.planned.checked_sub(self.actual)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetOverview {
    pub year: i32,
    pub month: u32,
    pub budget: Option<MonthlyBudget>,
    pub actual: MonthlyExpenses,
    pub buckets: Vec<BucketStatus>,
}

fn expenses(transactions: &[Transaction]) -> impl Iterator<Item = &Transaction> {
    transactions.iter().filter(|tx| tx.is_expense())
}

fn overflow() -> EngineError {
    EngineError::InvalidArgument("amount overflow while summing transactions".to_string())
}

fn sum<'a>(transactions: impl Iterator<Item = &'a Transaction>) -> ResultEngine<Money> {
    Money::checked_sum(transactions.map(|tx| tx.amount)).ok_or_else(overflow)
}

fn add_to(slot: &mut Money, amount: Money) -> ResultEngine<()> {
    *slot = slot.checked_add(amount).ok_or_else(overflow)?;
    Ok(())
}

/// Expense totals per category, largest first. Empty when nothing was spent.
pub fn expenses_by_category(transactions: &[Transaction]) -> ResultEngine<Vec<ExpenseByCategory>> {
    let total = sum(expenses(transactions))?;
    if !total.is_positive() {
        return Ok(Vec::new());
    }

    let mut groups: BTreeMap<Category, Money> = BTreeMap::new();
    for tx in expenses(transactions) {
        add_to(groups.entry(tx.category).or_default(), tx.amount)?;
    }

    let mut rows: Vec<ExpenseByCategory> = groups
        .into_iter()
        .map(|(category, amount)| ExpenseByCategory {
            category,
            amount,
            percentage: amount.percent_of(total),
        })
        .collect();
    rows.sort_by(|a, b| b.amount.cmp(&a.amount));
    Ok(rows)
}

/// Expense totals per `(category, subcategory)`, largest first.
pub fn expenses_by_subcategory(
    transactions: &[Transaction],
) -> ResultEngine<Vec<ExpenseBySubcategory>> {
    let total = sum(expenses(transactions))?;
    if !total.is_positive() {
        return Ok(Vec::new());
    }

    let mut groups: BTreeMap<(Category, Option<String>), Money> = BTreeMap::new();
    for tx in expenses(transactions) {
        let key = (tx.category, tx.subcategory.clone());
        add_to(groups.entry(key).or_default(), tx.amount)?;
    }

    let mut rows: Vec<ExpenseBySubcategory> = groups
        .into_iter()
        .map(|((category, subcategory), amount)| ExpenseBySubcategory {
            category,
            subcategory,
            amount,
            percentage: amount.percent_of(total),
        })
        .collect();
    rows.sort_by(|a, b| b.amount.cmp(&a.amount));
    Ok(rows)
}

pub fn balance(transactions: &[Transaction]) -> ResultEngine<BalanceInfo> {
    let total_income = sum(transactions.iter().filter(|tx| tx.is_income()))?;
    let total_expenses = sum(expenses(transactions))?;
    let balance = total_income
        .checked_sub(total_expenses)
        .ok_or_else(overflow)?;
    Ok(BalanceInfo {
        total_income,
        total_expenses,
        balance,
        savings_rate: balance.percent_of(total_income),
    })
}

/// Per-bucket expense sums.
pub fn monthly_expenses(
    transactions: &[Transaction],
    year: i32,
    month: u32,
) -> ResultEngine<MonthlyExpenses> {
    let mut totals = MonthlyExpenses {
        year,
        month,
        ..MonthlyExpenses::default()
    };
    for tx in expenses(transactions) {
        if let Some(bucket) = tx.bucket() {
            totals.add(bucket, tx.amount)?;
        }
    }
    Ok(totals)
}

/// Planned/actual lines for every bucket. Without a budget nothing is over.
pub fn budget_overview(budget: Option<MonthlyBudget>, actual: MonthlyExpenses) -> BudgetOverview {
    let buckets = KakeboCategory::ALL
        .into_iter()
        .map(|bucket| {
            let spent = actual.spent_in(bucket);
            let planned = budget
                .as_ref()
                .map_or(Money::ZERO, |b| b.budget_for(bucket));
            BucketStatus {
                bucket,
                planned,
                actual: spent,
                over_budget: budget.is_some() && spent > planned,
            }
        })
        .collect();
    BudgetOverview {
        year: actual.year,
        month: actual.month,
        budget,
        actual,
        buckets,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::TransactionType;

    fn tx(kind: TransactionType, category: Category, cents: i64) -> Transaction {
        Transaction::new(
            "t",
            Money::new(cents),
            NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
            kind,
            category,
        )
    }

    fn sample() -> Vec<Transaction> {
        vec![
            tx(TransactionType::Income, Category::Salary, 100_000),
            tx(TransactionType::Expense, Category::Food, 30_000),
            tx(TransactionType::Expense, Category::Food, 10_000).with_subcategory("Mercado"),
            tx(TransactionType::Expense, Category::Books, 20_000),
            tx(TransactionType::Expense, Category::Dining, 10_000),
        ]
    }

    #[test]
    fn category_percentages_sum_to_100() {
        let rows = expenses_by_category(&sample()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].category, Category::Food);
        assert_eq!(rows[0].amount, Money::new(40_000));
        assert!((rows[0].percentage - 57.142_857).abs() < 1e-4);
        let sum: f64 = rows.iter().map(|r| r.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn no_expenses_means_no_rows() {
        let only_income = vec![tx(TransactionType::Income, Category::Salary, 1000)];
        assert!(expenses_by_category(&only_income).unwrap().is_empty());
        assert!(expenses_by_subcategory(&[]).unwrap().is_empty());
    }

    #[test]
    fn subcategories_are_grouped_separately() {
        let rows = expenses_by_subcategory(&sample()).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].category, Category::Food);
        assert_eq!(rows[0].subcategory, None);
        assert!(
            rows.iter()
                .any(|r| r.subcategory.as_deref() == Some("Mercado"))
        );
    }

    #[test]
    fn balance_and_savings_rate() {
        let info = balance(&[
            tx(TransactionType::Income, Category::Salary, 100_000),
            tx(TransactionType::Expense, Category::Housing, 60_000),
        ])
        .unwrap();
        assert_eq!(info.balance, Money::new(40_000));
        assert_eq!(info.savings_rate, 40.0);
    }

    #[test]
    fn savings_rate_is_zero_without_income() {
        let info = balance(&[tx(TransactionType::Expense, Category::Food, 500)]).unwrap();
        assert_eq!(info.balance, Money::new(-500));
        assert_eq!(info.savings_rate, 0.0);
    }

    #[test]
    fn buckets_sum_expenses() {
        let totals = monthly_expenses(&sample(), 2024, 5).unwrap();
        assert_eq!(totals.survival, Money::new(40_000));
        assert_eq!(totals.optional, Money::new(10_000));
        assert_eq!(totals.culture, Money::new(20_000));
        assert_eq!(totals.unexpected, Money::ZERO);
        assert_eq!(totals.total(), Some(Money::new(70_000)));
    }

    #[test]
    fn overview_without_budget_is_never_over() {
        let overview = budget_overview(None, monthly_expenses(&sample(), 2024, 5).unwrap());
        assert_eq!(overview.buckets.len(), 4);
        assert!(overview.buckets.iter().all(|b| !b.over_budget));
    }

    #[test]
    fn overview_flags_overspent_buckets() {
        let mut budget = MonthlyBudget::new(2024, 5);
        budget.planned_income = Money::new(100_000);
        budget.survival_budget = Money::new(30_000);
        budget.culture_budget = Money::new(20_000);
        let actual = monthly_expenses(&sample(), 2024, 5).unwrap();
        let overview = budget_overview(Some(budget), actual);
        let survival = &overview.buckets[0];
        assert!(survival.over_budget);
        assert_eq!(survival.remaining(), Some(Money::new(-10_000)));
        // Spending exactly the budget is not over.
        assert!(!overview.buckets[2].over_budget);
    }

    #[test]
    fn overflowing_sums_are_errors() {
        let huge = i64::MAX / 2 + 1;
        let incomes = [
            tx(TransactionType::Income, Category::Salary, huge),
            tx(TransactionType::Income, Category::Freelance, huge),
        ];
        assert!(matches!(balance(&incomes), Err(EngineError::InvalidArgument(_))));

        let spent = [
            tx(TransactionType::Expense, Category::Food, huge),
            tx(TransactionType::Expense, Category::Housing, huge),
        ];
        assert!(expenses_by_category(&spent).is_err());
        assert!(expenses_by_subcategory(&spent).is_err());
        assert!(monthly_expenses(&spent, 2024, 5).is_err());
    }
}
