//! Monthly budget records.
//!
//! One `MonthlyBudget` per `(year, month)`: the planned income and how much
//! of it is assigned to each Kakebo bucket.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, KakeboCategory, Money, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyBudget {
    pub id: Option<i32>,
    pub year: i32,
    pub month: u32,
    pub planned_income: Money,
    pub survival_budget: Money,
    pub optional_budget: Money,
    pub culture_budget: Money,
    pub unexpected_budget: Money,
    pub created_at: DateTime<Utc>,
}

impl MonthlyBudget {
    /// Empty budget for a month, stamped now.
    pub fn new(year: i32, month: u32) -> Self {
        Self {
            id: None,
            year,
            month,
            planned_income: Money::ZERO,
            survival_budget: Money::ZERO,
            optional_budget: Money::ZERO,
            culture_budget: Money::ZERO,
            unexpected_budget: Money::ZERO,
            created_at: Utc::now(),
        }
    }

    /// Sum of the four bucket budgets (`None` on overflow).
    pub fn total_budget(&self) -> Option<Money> {
        Money::checked_sum(KakeboCategory::ALL.map(|bucket| self.budget_for(bucket)))
    }

    /// Planned income left after the bucket budgets (`None` on overflow).
    pub fn remaining_budget(&self) -> Option<Money> {
        self.planned_income.checked_sub(self.total_budget()?)
    }

    pub fn budget_for(&self, bucket: KakeboCategory) -> Money {
        match bucket {
            KakeboCategory::Survival => self.survival_budget,
            KakeboCategory::Optional => self.optional_budget,
            KakeboCategory::Culture => self.culture_budget,
            KakeboCategory::Unexpected => self.unexpected_budget,
        }
    }

    pub fn set_budget_for(&mut self, bucket: KakeboCategory, amount: Money) {
        match bucket {
            KakeboCategory::Survival => self.survival_budget = amount,
            KakeboCategory::Optional => self.optional_budget = amount,
            KakeboCategory::Culture => self.culture_budget = amount,
            KakeboCategory::Unexpected => self.unexpected_budget = amount,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub year: i32,
    pub month: i32,
    pub planned_income: i64,
    pub survival_budget: i64,
    pub optional_budget: i64,
    pub culture_budget: i64,
    pub unexpected_budget: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&MonthlyBudget> for ActiveModel {
    fn from(budget: &MonthlyBudget) -> Self {
        Self {
            id: match budget.id {
                Some(id) => ActiveValue::Unchanged(id),
                None => ActiveValue::NotSet,
            },
            year: ActiveValue::Set(budget.year),
            month: ActiveValue::Set(budget.month as i32),
            planned_income: ActiveValue::Set(budget.planned_income.cents()),
            survival_budget: ActiveValue::Set(budget.survival_budget.cents()),
            optional_budget: ActiveValue::Set(budget.optional_budget.cents()),
            culture_budget: ActiveValue::Set(budget.culture_budget.cents()),
            unexpected_budget: ActiveValue::Set(budget.unexpected_budget.cents()),
            created_at: ActiveValue::Set(budget.created_at),
        }
    }
}

impl TryFrom<Model> for MonthlyBudget {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        let month = u32::try_from(model.month)
            .ok()
            .filter(|month| (1..=12).contains(month))
            .ok_or_else(|| EngineError::InvalidArgument(format!("invalid month: {}", model.month)))?;
        Ok(Self {
            id: Some(model.id),
            year: model.year,
            month,
            planned_income: Money::new(model.planned_income),
            survival_budget: Money::new(model.survival_budget),
            optional_budget: Money::new(model.optional_budget),
            culture_budget: Money::new(model.culture_budget),
            unexpected_budget: Money::new(model.unexpected_budget),
            created_at: model.created_at,
        })
    }
}
