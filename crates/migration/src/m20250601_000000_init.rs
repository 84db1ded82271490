//! Initial schema migration.
//!
//! Creates the two Kakebo collections:
//!
//! - `transactions`: income/expense records, indexed on every column the
//!   reports filter or group by
//! - `budgets`: one planned budget per month, unique on `(year, month)`

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    Description,
    Amount,
    Date,
    Kind,
    Category,
    Subcategory,
    Notes,
}

#[derive(Iden)]
enum Budgets {
    Table,
    Id,
    Year,
    Month,
    PlannedIncome,
    SurvivalBudget,
    OptionalBudget,
    CultureBudget,
    UnexpectedBudget,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::Description).string().not_null())
                    .col(ColumnDef::new(Transactions::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Transactions::Date).date().not_null())
                    .col(ColumnDef::new(Transactions::Kind).string().not_null())
                    .col(ColumnDef::new(Transactions::Category).string().not_null())
                    .col(ColumnDef::new(Transactions::Subcategory).string())
                    .col(ColumnDef::new(Transactions::Notes).string())
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx-transactions-date", Transactions::Date),
            ("idx-transactions-category", Transactions::Category),
            ("idx-transactions-kind", Transactions::Kind),
            ("idx-transactions-subcategory", Transactions::Subcategory),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Transactions::Table)
                        .col(column)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }

        // ───────────────────────────────────────────────────────────────────
        // 2. Budgets
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Budgets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Budgets::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Budgets::Year).integer().not_null())
                    .col(ColumnDef::new(Budgets::Month).integer().not_null())
                    .col(ColumnDef::new(Budgets::PlannedIncome).big_integer().not_null())
                    .col(ColumnDef::new(Budgets::SurvivalBudget).big_integer().not_null())
                    .col(ColumnDef::new(Budgets::OptionalBudget).big_integer().not_null())
                    .col(ColumnDef::new(Budgets::CultureBudget).big_integer().not_null())
                    .col(
                        ColumnDef::new(Budgets::UnexpectedBudget)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Budgets::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uidx-budgets-year-month")
                    .table(Budgets::Table)
                    .col(Budgets::Year)
                    .col(Budgets::Month)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Budgets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        Ok(())
    }
}
