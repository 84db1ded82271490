//! Transaction records.
//!
//! A `Transaction` is a single income or expense on a calendar date. The
//! identity is assigned by the database on insert.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{Category, KakeboCategory, Locale, Money, ResultEngine, TransactionType};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Option<i32>,
    pub description: String,
    pub amount: Money,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: Category,
    pub subcategory: Option<String>,
    pub notes: Option<String>,
}

impl Transaction {
    /// New, not yet persisted transaction.
    ///
    /// Field constraints are checked by the store before any write, not here.
    pub fn new(
        description: impl Into<String>,
        amount: Money,
        date: NaiveDate,
        kind: TransactionType,
        category: Category,
    ) -> Self {
        Self {
            id: None,
            description: description.into(),
            amount,
            date,
            kind,
            category,
            subcategory: None,
            notes: None,
        }
    }

    #[must_use]
    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }

    /// Kakebo bucket; `None` for income.
    pub fn bucket(&self) -> Option<KakeboCategory> {
        match self.kind {
            TransactionType::Expense => self.category.bucket().ok(),
            TransactionType::Income => None,
        }
    }

    pub fn category_display_name(&self, locale: Locale) -> &'static str {
        self.category.display_name(locale)
    }

    pub fn full_category_name(&self, locale: Locale) -> String {
        self.category.full_name(self.subcategory.as_deref(), locale)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub description: String,
    pub amount: i64,
    pub date: Date,
    pub kind: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: match tx.id {
                Some(id) => ActiveValue::Unchanged(id),
                None => ActiveValue::NotSet,
            },
            description: ActiveValue::Set(tx.description.clone()),
            amount: ActiveValue::Set(tx.amount.cents()),
            date: ActiveValue::Set(tx.date),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            category: ActiveValue::Set(tx.category.as_str().to_string()),
            subcategory: ActiveValue::Set(tx.subcategory.clone()),
            notes: ActiveValue::Set(tx.notes.clone()),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = crate::EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: Some(model.id),
            description: model.description,
            amount: Money::new(model.amount),
            date: model.date,
            kind: TransactionType::try_from(model.kind.as_str())?,
            category: Category::try_from(model.category.as_str())?,
            subcategory: model.subcategory,
            notes: model.notes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Transaction {
        Transaction::new(
            "Weekly groceries",
            Money::new(45_20),
            NaiveDate::from_ymd_opt(2024, 5, 3).unwrap(),
            TransactionType::Expense,
            Category::Food,
        )
    }

    #[test]
    fn expense_has_bucket_income_does_not() {
        assert_eq!(sample().bucket(), Some(KakeboCategory::Survival));
        let salary = Transaction::new(
            "May salary",
            Money::from_units(2000),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            TransactionType::Income,
            Category::Salary,
        );
        assert_eq!(salary.bucket(), None);
    }

    #[test]
    fn full_category_name_uses_subcategory() {
        let tx = sample().with_subcategory("Mercado");
        assert_eq!(tx.full_category_name(Locale::Es), "Comida - Mercado");
        assert_eq!(sample().full_category_name(Locale::En), "Food");
    }

    #[test]
    fn text_is_stored_as_given() {
        let mut tx = sample().with_notes(" paid cash ");
        tx.description = "  Rent May ".to_string();
        let active = ActiveModel::from(&tx);
        assert_eq!(
            active.description,
            ActiveValue::Set("  Rent May ".to_string())
        );
        assert_eq!(active.subcategory, ActiveValue::Set(None));
        assert_eq!(
            active.notes,
            ActiveValue::Set(Some(" paid cash ".to_string()))
        );
        assert_eq!(active.id, ActiveValue::NotSet);
    }

    #[test]
    fn model_with_unknown_category_is_rejected() {
        let model = Model {
            id: 1,
            description: "x".to_string(),
            amount: 100,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            kind: "expense".to_string(),
            category: "groceries".to_string(),
            subcategory: None,
            notes: None,
        };
        assert!(Transaction::try_from(model).is_err());
    }
}
