use std::{path::PathBuf, sync::Arc};

use chrono::NaiveDate;
use engine::{
    BudgetService, Category, DatabaseConfig, DatabaseService, EngineError, KakeboCategory,
    KakeboStore, Money, MonthlyBudget, Platform, StoreError, Transaction, TransactionService,
    TransactionType,
};
use sea_orm::{ConnectionTrait, Database};
use uuid::Uuid;

fn test_root() -> PathBuf {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();
    root
}

fn test_db_path() -> PathBuf {
    test_root().join(format!("services_{}.db", Uuid::new_v4()))
}

struct Services {
    database: DatabaseService,
    transactions: TransactionService,
    budgets: BudgetService,
}

async fn services() -> Services {
    let store = Arc::new(KakeboStore::new());
    let database = DatabaseService::new(store.clone());
    database
        .connect(DatabaseConfig::new(test_db_path()))
        .await
        .unwrap();
    let transactions = TransactionService::new(store.clone());
    let budgets = BudgetService::new(store, transactions.clone());
    Services {
        database,
        transactions,
        budgets,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn income(units: i64, on: NaiveDate) -> Transaction {
    Transaction::new(
        "Salary",
        Money::from_units(units),
        on,
        TransactionType::Income,
        Category::Salary,
    )
}

fn expense(units: i64, category: Category, on: NaiveDate) -> Transaction {
    Transaction::new(
        "Expense",
        Money::from_units(units),
        on,
        TransactionType::Expense,
        category,
    )
}

struct FakePlatform {
    picked: Option<PathBuf>,
    data_dir: PathBuf,
}

impl Platform for FakePlatform {
    async fn pick_file(&self, _title: &str, _extensions: &[&str]) -> Option<PathBuf> {
        self.picked.clone()
    }

    async fn save_file(
        &self,
        _title: &str,
        _default_name: &str,
        _extensions: &[&str],
    ) -> Option<PathBuf> {
        self.picked.clone()
    }

    fn local_data_path(&self) -> PathBuf {
        self.data_dir.clone()
    }
}

#[tokio::test]
async fn monthly_balance_and_savings_rate() {
    let s = services().await;
    s.transactions.add(&income(1000, date(2024, 5, 1))).await.unwrap();
    s.transactions
        .add(&expense(600, Category::Housing, date(2024, 5, 2)))
        .await
        .unwrap();
    // Outside the month.
    s.transactions
        .add(&expense(50, Category::Food, date(2024, 6, 1)))
        .await
        .unwrap();

    let balance = s.transactions.get_balance(2024, 5).await.unwrap();
    assert_eq!(balance.total_income, Money::from_units(1000));
    assert_eq!(balance.total_expenses, Money::from_units(600));
    assert_eq!(balance.balance, Money::from_units(400));
    assert_eq!(balance.savings_rate, 40.0);
    assert_eq!(s.budgets.get_savings_rate(2024, 5).await.unwrap(), 40.0);

    let total = s.transactions.get_total_balance().await.unwrap();
    assert_eq!(total.balance, Money::from_units(350));
}

#[tokio::test]
async fn savings_rate_without_income_is_zero() {
    let s = services().await;
    s.transactions
        .add(&expense(20, Category::Food, date(2024, 5, 2)))
        .await
        .unwrap();
    assert_eq!(s.budgets.get_savings_rate(2024, 5).await.unwrap(), 0.0);
}

#[tokio::test]
async fn expenses_by_category_for_month() {
    let s = services().await;
    assert!(
        s.transactions
            .get_expenses_by_category(2024, 5)
            .await
            .unwrap()
            .is_empty()
    );

    s.transactions.add(&income(1000, date(2024, 5, 1))).await.unwrap();
    for (units, category) in [
        (300, Category::Food),
        (100, Category::Food),
        (200, Category::Books),
        (100, Category::Travel),
    ] {
        s.transactions
            .add(&expense(units, category, date(2024, 5, 10)))
            .await
            .unwrap();
    }

    let rows = s.transactions.get_expenses_by_category(2024, 5).await.unwrap();
    let categories: Vec<Category> = rows.iter().map(|r| r.category).collect();
    assert_eq!(
        categories,
        vec![Category::Food, Category::Books, Category::Travel]
    );
    assert_eq!(rows[0].amount, Money::from_units(400));
    assert!((rows[0].percentage - 57.142_857).abs() < 1e-4);
    let sum: f64 = rows.iter().map(|r| r.percentage).sum();
    assert!((sum - 100.0).abs() < 1e-6);
}

#[tokio::test]
async fn expenses_by_subcategory_for_month() {
    let s = services().await;
    s.transactions
        .add(&expense(30, Category::Food, date(2024, 5, 1)).with_subcategory("Mercado"))
        .await
        .unwrap();
    s.transactions
        .add(&expense(10, Category::Food, date(2024, 5, 2)).with_subcategory("Panadería"))
        .await
        .unwrap();
    s.transactions
        .add(&expense(20, Category::Food, date(2024, 5, 3)).with_subcategory("Mercado"))
        .await
        .unwrap();

    let rows = s
        .transactions
        .get_expenses_by_subcategory(2024, 5)
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].subcategory.as_deref(), Some("Mercado"));
    assert_eq!(rows[0].amount, Money::from_units(50));
}

#[tokio::test]
async fn invalid_month_is_invalid_argument() {
    let s = services().await;
    assert!(matches!(
        s.transactions.get_by_month(2024, 13).await.unwrap_err(),
        EngineError::InvalidArgument(_)
    ));
}

#[tokio::test]
async fn store_errors_become_faults() {
    let s = services().await;
    let err = s
        .transactions
        .add(&expense(0, Category::Food, date(2024, 5, 1)))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Store(StoreError::Validation(
            "Amount must be at least 0.01".to_string()
        ))
    );
    assert_eq!(
        err.to_string(),
        "Database error: Validation failed: Amount must be at least 0.01"
    );

    let unsaved = expense(5, Category::Food, date(2024, 5, 1));
    assert!(matches!(
        s.transactions.delete_transaction(&unsaved).await.unwrap_err(),
        EngineError::InvalidArgument(_)
    ));
}

#[tokio::test]
async fn round_trip_through_service() {
    let s = services().await;
    let tx = expense(12, Category::Subscriptions, date(2024, 5, 1)).with_notes("yearly");
    let saved = s.transactions.add(&tx).await.unwrap();
    let loaded = s
        .transactions
        .get_by_id(saved.id.unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded, Transaction { id: saved.id, ..tx });

    s.transactions.delete_transaction(&loaded).await.unwrap();
    assert_eq!(s.transactions.get_by_id(saved.id.unwrap()).await.unwrap(), None);
}

#[tokio::test]
async fn actual_expenses_per_bucket() {
    let s = services().await;
    s.transactions.add(&income(2000, date(2024, 5, 1))).await.unwrap();
    for (units, category) in [
        (600, Category::Housing),
        (100, Category::Food),
        (80, Category::Dining),
        (40, Category::Courses),
        (25, Category::Repairs),
    ] {
        s.transactions
            .add(&expense(units, category, date(2024, 5, 15)))
            .await
            .unwrap();
    }

    let actual = s.budgets.calculate_actual_expenses(2024, 5).await.unwrap();
    assert_eq!(actual.survival, Money::from_units(700));
    assert_eq!(actual.optional, Money::from_units(80));
    assert_eq!(actual.culture, Money::from_units(40));
    assert_eq!(actual.unexpected, Money::from_units(25));
}

#[tokio::test]
async fn over_budget_needs_a_budget() {
    let s = services().await;
    s.transactions
        .add(&expense(500, Category::Food, date(2024, 5, 15)))
        .await
        .unwrap();

    assert!(
        !s.budgets
            .is_over_budget(2024, 5, KakeboCategory::Survival)
            .await
            .unwrap()
    );

    let mut budget = MonthlyBudget::new(2024, 5);
    budget.planned_income = Money::from_units(1000);
    budget.survival_budget = Money::from_units(400);
    budget.optional_budget = Money::from_units(100);
    s.budgets.save_monthly_budget(&budget).await.unwrap();

    assert!(
        s.budgets
            .is_over_budget(2024, 5, KakeboCategory::Survival)
            .await
            .unwrap()
    );
    assert!(
        !s.budgets
            .is_over_budget(2024, 5, KakeboCategory::Optional)
            .await
            .unwrap()
    );

    let overview = s.budgets.budget_overview(2024, 5).await.unwrap();
    assert!(overview.budget.is_some());
    assert_eq!(overview.buckets.len(), 4);
    assert_eq!(overview.buckets[0].bucket, KakeboCategory::Survival);
    assert_eq!(overview.buckets[0].planned, Money::from_units(400));
    assert_eq!(overview.buckets[0].actual, Money::from_units(500));
    assert!(overview.buckets[0].over_budget);
}

#[tokio::test]
async fn budget_upsert_through_service() {
    let s = services().await;
    let mut budget = MonthlyBudget::new(2024, 5);
    budget.planned_income = Money::from_units(1000);
    budget.survival_budget = Money::from_units(1000);
    s.budgets.save_monthly_budget(&budget).await.unwrap();

    budget.survival_budget = Money::from_units(500);
    s.budgets.save_monthly_budget(&budget).await.unwrap();

    let all = s.budgets.get_all_budgets().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].survival_budget, Money::from_units(500));

    budget.culture_budget = Money::from_units(501);
    let err = s.budgets.save_monthly_budget(&budget).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::Store(StoreError::Validation(
            "Total budget cannot exceed planned income".to_string()
        ))
    );
}

#[tokio::test]
async fn test_connection_restores_active_database() {
    let s = services().await;
    let active = s.database.current_config().await.unwrap();
    s.transactions.add(&income(10, date(2024, 5, 1))).await.unwrap();

    let other = DatabaseConfig::new(test_db_path());
    assert_eq!(s.database.test_connection(&other).await.unwrap(), 0);

    assert_eq!(s.database.current_config().await, Some(active));
    assert!(s.database.is_connected().await);
    assert_eq!(s.transactions.get_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn failed_test_connection_keeps_active_database() {
    let s = services().await;
    let missing = DatabaseConfig::new(test_root().join("missing").join("nothing.db")).read_only(true);
    assert!(s.database.test_connection(&missing).await.is_err());
    assert!(s.database.is_connected().await);
}

#[tokio::test]
async fn test_connection_without_active_database_disconnects() {
    let store = Arc::new(KakeboStore::new());
    let database = DatabaseService::new(store.clone());
    let config = DatabaseConfig::new(test_db_path());
    assert_eq!(database.test_connection(&config).await.unwrap(), 0);
    assert!(!database.is_connected().await);
    assert!(!store.is_connected().await);
}

#[tokio::test]
async fn create_database_makes_parent_directories() {
    let store = Arc::new(KakeboStore::new());
    let database = DatabaseService::new(store);
    let path = test_root()
        .join(format!("nested_{}", Uuid::new_v4()))
        .join("deeper")
        .join("kakebo.db");

    database
        .create_database(&path, Some("pw".to_string()))
        .await
        .unwrap();
    assert!(path.exists());
    assert!(database.is_connected().await);
    assert_eq!(
        database.current_config().await.unwrap().password.as_deref(),
        Some("pw")
    );
}

#[tokio::test]
async fn cancelled_picker_does_not_connect() {
    let store = Arc::new(KakeboStore::new());
    let database = DatabaseService::new(store);
    let platform = FakePlatform {
        picked: None,
        data_dir: test_root(),
    };

    assert!(!database.open_with_picker(&platform, None, false).await.unwrap());
    assert!(!database.create_with_picker(&platform, None).await.unwrap());
    assert!(!database.is_connected().await);
}

#[tokio::test]
async fn picked_file_is_created_then_opened() {
    let store = Arc::new(KakeboStore::new());
    let database = DatabaseService::new(store);
    let platform = FakePlatform {
        picked: Some(test_db_path()),
        data_dir: test_root(),
    };

    assert!(database.create_with_picker(&platform, None).await.unwrap());
    database.disconnect().await;
    assert!(database.open_with_picker(&platform, None, true).await.unwrap());
    assert!(
        database
            .current_config()
            .await
            .is_some_and(|config| config.read_only)
    );
}

#[test]
fn default_database_path_uses_platform_dir() {
    let platform = FakePlatform {
        picked: None,
        data_dir: PathBuf::from("/data/kakebo"),
    };
    assert_eq!(
        DatabaseService::default_database_path(&platform),
        PathBuf::from("/data/kakebo/kakebo.db")
    );
}

#[tokio::test]
async fn overflowing_report_sums_are_faults_not_panics() {
    let path = test_db_path();
    let store = Arc::new(KakeboStore::new());
    let database = DatabaseService::new(store.clone());
    database
        .connect(DatabaseConfig::new(&path))
        .await
        .unwrap();
    let transactions = TransactionService::new(store.clone());
    let budgets = BudgetService::new(store, transactions.clone());

    // Rows written by another tool, outside the store's amount limit.
    let raw = Database::connect(DatabaseConfig::new(&path).url())
        .await
        .unwrap();
    raw.execute_unprepared(
        "INSERT INTO transactions (description, amount, date, kind, category) VALUES \
         ('Bonus', 5000000000000000000, '2024-05-10', 'income', 'salary'), \
         ('Bonus', 5000000000000000000, '2024-05-11', 'income', 'salary'), \
         ('Loss', 5000000000000000000, '2024-05-12', 'expense', 'emergency'), \
         ('Loss', 5000000000000000000, '2024-05-13', 'expense', 'repairs')",
    )
    .await
    .unwrap();
    raw.close().await.unwrap();

    assert!(matches!(
        transactions.get_total_balance().await.unwrap_err(),
        EngineError::InvalidArgument(_)
    ));
    assert!(transactions.get_balance(2024, 5).await.is_err());
    assert!(transactions.get_expenses_by_category(2024, 5).await.is_err());
    assert!(transactions.get_expenses_by_subcategory(2024, 5).await.is_err());
    assert!(budgets.calculate_actual_expenses(2024, 5).await.is_err());
    assert!(budgets.budget_overview(2024, 5).await.is_err());
}
