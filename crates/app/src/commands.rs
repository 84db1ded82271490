//! Command handlers: parse arguments into engine types, call the services and
//! print the outcome as text or JSON.

use std::sync::Arc;

use chrono::Local;
use engine::{
    BalanceInfo, BudgetOverview, BudgetService, Category, DatabaseConfig, DatabaseService,
    KakeboCategory, KakeboStore, Locale, Money, MonthlyBudget, Transaction, TransactionService,
    TransactionType, default_category, expense_categories, income_categories,
};
use serde::Serialize;
use serde_json::json;

use crate::{
    cli::{
        AddArgs, BalanceArgs, BudgetCommand, BudgetSetArgs, CategoriesArgs, Cli, Command,
        InitArgs, ListArgs, ReportArgs, UpdateArgs, YearMonth,
    },
    error::{AppError, Result},
    settings::Settings,
    terminal::{self, TerminalPlatform},
};

struct App {
    database: DatabaseService,
    transactions: TransactionService,
    budgets: BudgetService,
    locale: Locale,
    json: bool,
}

impl App {
    fn new(locale: Locale, json: bool) -> Self {
        let store = Arc::new(KakeboStore::new());
        let transactions = TransactionService::new(store.clone());
        Self {
            database: DatabaseService::new(store.clone()),
            budgets: BudgetService::new(store, transactions.clone()),
            transactions,
            locale,
            json,
        }
    }

    /// Prints `value` as JSON, or the text rendering otherwise.
    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", text());
        }
        Ok(())
    }

    fn transaction_line(&self, tx: &Transaction) -> String {
        let id = tx.id.map_or_else(|| "-".to_string(), |id| id.to_string());
        let sign = if tx.is_income() { "+" } else { "-" };
        format!(
            "#{id:<5} {}  {sign}{:>11}  {:<28}  {}",
            tx.date,
            tx.amount.to_string(),
            tx.full_category_name(self.locale),
            tx.description
        )
    }
}

/// Where the database password comes from.
struct Credentials {
    ask: bool,
    password: Option<String>,
}

impl Credentials {
    async fn existing(&self) -> Result<Option<String>> {
        if self.ask {
            terminal::prompt_password("Password: ").await
        } else {
            Ok(self.password.clone())
        }
    }

    async fn new_database(&self) -> Result<Option<String>> {
        if self.ask {
            terminal::prompt_new_password().await
        } else {
            Ok(self.password.clone())
        }
    }
}

pub async fn run(cli: Cli, settings: Settings) -> Result<()> {
    let app = App::new(settings.locale()?, cli.json);
    let credentials = Credentials {
        ask: cli.ask_password,
        password: cli.password,
    };

    match cli.command {
        Command::Categories(args) => categories(&app, args),
        Command::Init(args) => init(&app, &credentials, &settings, args).await,
        Command::Check => {
            let config = database_config(&settings, credentials.existing().await?);
            check(&app, config).await
        }
        command => {
            let config = database_config(&settings, credentials.existing().await?);
            app.database.connect(config).await?;
            let outcome = dispatch(&app, command).await;
            app.database.disconnect().await;
            outcome
        }
    }
}

async fn dispatch(app: &App, command: Command) -> Result<()> {
    match command {
        Command::Add(args) => add(app, args).await,
        Command::Update(args) => update(app, args).await,
        Command::Delete { id } => delete(app, id).await,
        Command::Show { id } => show(app, id).await,
        Command::List(args) => list(app, args).await,
        Command::Report(args) => report(app, args).await,
        Command::Balance(args) => balance(app, args).await,
        Command::Budget(budget) => match budget.command {
            BudgetCommand::Set(args) => budget_set(app, args).await,
            BudgetCommand::Show { month } => budget_show(app, month).await,
            BudgetCommand::List => budget_list(app).await,
        },
        Command::Init(_) | Command::Check | Command::Categories(_) => Ok(()),
    }
}

fn database_config(settings: &Settings, password: Option<String>) -> DatabaseConfig {
    let path = settings
        .database
        .clone()
        .unwrap_or_else(|| DatabaseService::default_database_path(&TerminalPlatform));
    DatabaseConfig::new(path)
        .with_password(password)
        .read_only(settings.read_only)
}

fn parse_amount(raw: &str) -> Result<Money> {
    Ok(raw.parse::<Money>()?)
}

fn not_found(id: i32) -> AppError {
    AppError::Input(format!("Transaction with ID {id} not found"))
}

async fn init(
    app: &App,
    credentials: &Credentials,
    settings: &Settings,
    args: InitArgs,
) -> Result<()> {
    if settings.read_only {
        return Err(AppError::Input(
            "cannot create a database in read-only mode".to_string(),
        ));
    }
    let password = credentials.new_database().await?;

    if args.pick {
        let created = app
            .database
            .create_with_picker(&TerminalPlatform, password)
            .await?;
        if !created {
            println!("Cancelled.");
            return Ok(());
        }
    } else {
        let path = args
            .path
            .or_else(|| settings.database.clone())
            .unwrap_or_else(|| DatabaseService::default_database_path(&TerminalPlatform));
        app.database.create_database(&path, password).await?;
    }

    let path = app
        .database
        .current_config()
        .await
        .map(|config| config.path)
        .unwrap_or_default();
    app.database.disconnect().await;
    app.emit(&json!({ "path": path }), || {
        format!("Database ready at {}", path.display())
    })
}

async fn check(app: &App, config: DatabaseConfig) -> Result<()> {
    let count = app.database.test_connection(&config).await?;
    app.emit(
        &json!({ "path": config.path, "transactions": count }),
        || {
            format!(
                "Connection OK: {} ({count} transactions)",
                config.path.display()
            )
        },
    )
}

async fn add(app: &App, args: AddArgs) -> Result<()> {
    let kind = TransactionType::try_from(args.kind.as_str())?;
    let category = match args.category.as_deref() {
        Some(code) => Category::try_from(code)?,
        None => default_category(kind),
    };
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let mut tx = Transaction::new(
        args.description,
        parse_amount(&args.amount)?,
        date,
        kind,
        category,
    );
    tx.subcategory = args.subcategory;
    tx.notes = args.notes;

    let saved = app.transactions.add(&tx).await?;
    app.emit(&saved, || format!("Added {}", app.transaction_line(&saved)))
}

async fn update(app: &App, args: UpdateArgs) -> Result<()> {
    let mut tx = app
        .transactions
        .get_by_id(args.id)
        .await?
        .ok_or_else(|| not_found(args.id))?;

    if let Some(description) = args.description {
        tx.description = description;
    }
    if let Some(amount) = args.amount {
        tx.amount = parse_amount(&amount)?;
    }
    if let Some(date) = args.date {
        tx.date = date;
    }
    if let Some(kind) = args.kind {
        tx.kind = TransactionType::try_from(kind.as_str())?;
    }
    match args.category {
        Some(code) => tx.category = Category::try_from(code.as_str())?,
        None if !tx.category.is_valid_for(tx.kind) => tx.category = default_category(tx.kind),
        None => {}
    }
    if let Some(subcategory) = args.subcategory {
        tx.subcategory = Some(subcategory).filter(|s| !s.trim().is_empty());
    }
    if let Some(notes) = args.notes {
        tx.notes = Some(notes).filter(|s| !s.trim().is_empty());
    }

    let saved = app.transactions.update(&tx).await?;
    app.emit(&saved, || format!("Updated {}", app.transaction_line(&saved)))
}

async fn delete(app: &App, id: i32) -> Result<()> {
    app.transactions.delete(id).await?;
    app.emit(&json!({ "deleted": id }), || format!("Deleted #{id}"))
}

async fn show(app: &App, id: i32) -> Result<()> {
    let tx = app
        .transactions
        .get_by_id(id)
        .await?
        .ok_or_else(|| not_found(id))?;
    app.emit(&tx, || {
        let mut text = app.transaction_line(&tx);
        if let Some(bucket) = tx.bucket() {
            text.push_str(&format!("\n       bucket: {}", bucket.display_name(app.locale)));
        }
        if let Some(notes) = &tx.notes {
            text.push_str(&format!("\n       notes: {notes}"));
        }
        text
    })
}

async fn list(app: &App, args: ListArgs) -> Result<()> {
    let transactions = match (args.month, args.from, args.to) {
        (Some(month), _, _) => app.transactions.get_by_month(month.year, month.month).await?,
        (None, Some(from), Some(to)) => app.transactions.get_by_date_range(from, to).await?,
        _ => app.transactions.get_all().await?,
    };
    app.emit(&transactions, || {
        if transactions.is_empty() {
            return "No transactions.".to_string();
        }
        transactions
            .iter()
            .map(|tx| app.transaction_line(tx))
            .collect::<Vec<_>>()
            .join("\n")
    })
}

async fn report(app: &App, args: ReportArgs) -> Result<()> {
    let month = args.month.unwrap_or_else(YearMonth::current);
    if args.by_subcategory {
        let rows = app
            .transactions
            .get_expenses_by_subcategory(month.year, month.month)
            .await?;
        app.emit(&rows, || {
            if rows.is_empty() {
                return format!("No expenses in {month}.");
            }
            rows.iter()
                .map(|row| {
                    format!(
                        "{:<36} {:>11} {:>6.1}%",
                        row.category.full_name(row.subcategory.as_deref(), app.locale),
                        row.amount.to_string(),
                        row.percentage
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        })
    } else {
        let rows = app
            .transactions
            .get_expenses_by_category(month.year, month.month)
            .await?;
        app.emit(&rows, || {
            if rows.is_empty() {
                return format!("No expenses in {month}.");
            }
            rows.iter()
                .map(|row| {
                    format!(
                        "{:<20} {:>11} {:>6.1}%",
                        row.category.display_name(app.locale),
                        row.amount.to_string(),
                        row.percentage
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        })
    }
}

fn balance_text(label: &str, info: &BalanceInfo) -> String {
    format!(
        "{label}\n  income:       {:>11}\n  expenses:     {:>11}\n  balance:      {:>11}\n  savings rate: {:>10.1}%",
        info.total_income.to_string(),
        info.total_expenses.to_string(),
        info.balance.to_string(),
        info.savings_rate
    )
}

async fn balance(app: &App, args: BalanceArgs) -> Result<()> {
    if args.all {
        let info = app.transactions.get_total_balance().await?;
        return app.emit(&info, || balance_text("All time", &info));
    }
    let month = args.month.unwrap_or_else(YearMonth::current);
    let info = app.transactions.get_balance(month.year, month.month).await?;
    app.emit(&info, || balance_text(&month.to_string(), &info))
}

async fn budget_set(app: &App, args: BudgetSetArgs) -> Result<()> {
    let month = args.month.unwrap_or_else(YearMonth::current);
    let mut budget = MonthlyBudget::new(month.year, month.month);
    budget.planned_income = parse_amount(&args.income)?;
    for (bucket, raw) in [
        (KakeboCategory::Survival, &args.survival),
        (KakeboCategory::Optional, &args.optional),
        (KakeboCategory::Culture, &args.culture),
        (KakeboCategory::Unexpected, &args.unexpected),
    ] {
        budget.set_budget_for(bucket, parse_amount(raw)?);
    }

    let saved = app.budgets.save_monthly_budget(&budget).await?;
    app.emit(&saved, || {
        format!(
            "Saved budget for {month}: {} planned, {} unassigned",
            saved.planned_income,
            budget_amount(saved.remaining_budget())
        )
    })
}

fn budget_amount(amount: Option<Money>) -> String {
    amount.map_or_else(|| "overflow".to_string(), |amount| amount.to_string())
}

fn overview_text(locale: Locale, month: YearMonth, overview: &BudgetOverview) -> String {
    let mut lines = vec![match &overview.budget {
        Some(budget) => format!(
            "Budget {month}: income {}, assigned {}, unassigned {}",
            budget.planned_income,
            budget_amount(budget.total_budget()),
            budget_amount(budget.remaining_budget())
        ),
        None => format!("No budget for {month}"),
    }];
    for line in &overview.buckets {
        lines.push(format!(
            "  {:<14} {:>11} / {:>11}{}",
            line.bucket.display_name(locale),
            line.actual.to_string(),
            line.planned.to_string(),
            if line.over_budget { "  OVER" } else { "" }
        ));
    }
    lines.join("\n")
}

async fn budget_show(app: &App, month: Option<YearMonth>) -> Result<()> {
    let month = month.unwrap_or_else(YearMonth::current);
    let overview = app.budgets.budget_overview(month.year, month.month).await?;
    app.emit(&overview, || overview_text(app.locale, month, &overview))
}

async fn budget_list(app: &App) -> Result<()> {
    let budgets = app.budgets.get_all_budgets().await?;
    app.emit(&budgets, || {
        if budgets.is_empty() {
            return "No budgets.".to_string();
        }
        budgets
            .iter()
            .map(|b| {
                format!(
                    "{}-{:02}  income {:>11}  assigned {:>11}",
                    b.year,
                    b.month,
                    b.planned_income.to_string(),
                    budget_amount(b.total_budget())
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    })
}

#[derive(Serialize)]
struct CategoryRow {
    code: &'static str,
    name: &'static str,
    #[serde(rename = "type")]
    kind: TransactionType,
    bucket: Option<KakeboCategory>,
    subcategories: &'static [&'static str],
}

fn categories(app: &App, args: CategoriesArgs) -> Result<()> {
    let selected = match args.kind.as_deref().map(TransactionType::try_from).transpose()? {
        Some(TransactionType::Income) => income_categories(),
        Some(TransactionType::Expense) => expense_categories(),
        None => Category::ALL.to_vec(),
    };
    let rows: Vec<CategoryRow> = selected
        .into_iter()
        .map(|category| CategoryRow {
            code: category.as_str(),
            name: category.display_name(app.locale),
            kind: if category.is_income() {
                TransactionType::Income
            } else {
                TransactionType::Expense
            },
            bucket: category.bucket().ok(),
            subcategories: category.common_subcategories(),
        })
        .collect();

    app.emit(&rows, || {
        rows.iter()
            .map(|row| {
                let group = row
                    .bucket
                    .map_or("income", |bucket| bucket.display_name(app.locale));
                let mut line = format!("{:<16} {:<18} {group}", row.code, row.name);
                if args.subcategories {
                    line.push_str(&format!("\n    {}", row.subcategories.join(", ")));
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n")
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn sample() -> Transaction {
        Transaction {
            id: Some(7),
            ..Transaction::new(
                "Weekly groceries",
                Money::new(45_20),
                NaiveDate::from_ymd_opt(2024, 5, 3).unwrap(),
                TransactionType::Expense,
                Category::Food,
            )
        }
    }

    #[test]
    fn transaction_line_shows_sign_and_category() {
        let app = App::new(Locale::En, false);
        let line = app.transaction_line(&sample().with_subcategory("Market"));
        assert!(line.starts_with("#7 "));
        assert!(line.contains("-      45.20"));
        assert!(line.contains("Food - Market"));
        assert!(line.ends_with("Weekly groceries"));
    }

    #[test]
    fn overview_marks_overspent_buckets() {
        let mut budget = MonthlyBudget::new(2024, 5);
        budget.planned_income = Money::from_units(1000);
        budget.survival_budget = Money::from_units(100);
        let overview = BudgetOverview {
            year: 2024,
            month: 5,
            budget: Some(budget),
            actual: engine::MonthlyExpenses {
                year: 2024,
                month: 5,
                survival: Money::from_units(150),
                ..Default::default()
            },
            buckets: vec![engine::BucketStatus {
                bucket: KakeboCategory::Survival,
                planned: Money::from_units(100),
                actual: Money::from_units(150),
                over_budget: true,
            }],
        };
        let text = overview_text(
            Locale::En,
            YearMonth {
                year: 2024,
                month: 5,
            },
            &overview,
        );
        assert!(text.starts_with("Budget 2024-05: income 1000.00"));
        assert!(text.contains("Survival"));
        assert!(text.ends_with("OVER"));
    }

    #[test]
    fn amounts_parse_with_comma() {
        assert_eq!(parse_amount("12,5").unwrap(), Money::new(1250));
        assert!(matches!(parse_amount("1.234"), Err(AppError::Engine(_))));
    }
}
