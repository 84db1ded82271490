//! Internal helpers for record validation.
//!
//! These utilities are **not** part of the public API. The store calls them
//! before every write; each returns the list of violated rules so callers can
//! report them all at once.

use crate::{Money, MonthlyBudget, Transaction};

const MAX_DESCRIPTION_LEN: usize = 200;
const MAX_SUBCATEGORY_LEN: usize = 100;
const MAX_NOTES_LEN: usize = 500;
const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 2100;
/// Largest accepted amount. Sums of a budget's amounts stay far below `i64::MAX`.
const MAX_AMOUNT: Money = Money::new(99_999_999_999_999);

/// Rules a transaction breaks; empty when it can be stored.
pub(crate) fn transaction_violations(tx: &Transaction) -> Vec<String> {
    let mut violations = Vec::new();

    if tx.description.trim().is_empty() {
        violations.push("Description is required".to_string());
    } else if tx.description.chars().count() > MAX_DESCRIPTION_LEN {
        violations.push(format!(
            "Description cannot exceed {MAX_DESCRIPTION_LEN} characters"
        ));
    }
    if tx.amount < Money::new(1) {
        violations.push("Amount must be at least 0.01".to_string());
    } else if tx.amount > MAX_AMOUNT {
        violations.push(format!("Amount cannot exceed {MAX_AMOUNT}"));
    }
    if !tx.category.is_valid_for(tx.kind) {
        violations.push(format!(
            "Category '{}' is not valid for {} transactions",
            tx.category, tx.kind
        ));
    }
    if let Some(sub) = &tx.subcategory
        && sub.chars().count() > MAX_SUBCATEGORY_LEN
    {
        violations.push(format!(
            "Subcategory cannot exceed {MAX_SUBCATEGORY_LEN} characters"
        ));
    }
    if let Some(notes) = &tx.notes
        && notes.chars().count() > MAX_NOTES_LEN
    {
        violations.push(format!("Notes cannot exceed {MAX_NOTES_LEN} characters"));
    }

    violations
}

/// Rules a monthly budget breaks; empty when it can be stored.
pub(crate) fn budget_violations(budget: &MonthlyBudget) -> Vec<String> {
    let mut violations = Vec::new();

    if !(MIN_YEAR..=MAX_YEAR).contains(&budget.year) {
        violations.push(format!("Year must be between {MIN_YEAR} and {MAX_YEAR}"));
    }
    if !(1..=12).contains(&budget.month) {
        violations.push("Month must be between 1 and 12".to_string());
    }
    for (label, amount) in [
        ("Planned income", budget.planned_income),
        ("Survival budget", budget.survival_budget),
        ("Optional budget", budget.optional_budget),
        ("Culture budget", budget.culture_budget),
        ("Unexpected budget", budget.unexpected_budget),
    ] {
        if amount.is_negative() {
            violations.push(format!("{label} cannot be negative"));
        } else if amount > MAX_AMOUNT {
            violations.push(format!("{label} cannot exceed {MAX_AMOUNT}"));
        }
    }
    if budget
        .total_budget()
        .is_none_or(|total| total > budget.planned_income)
    {
        violations.push("Total budget cannot exceed planned income".to_string());
    }

    violations
}
