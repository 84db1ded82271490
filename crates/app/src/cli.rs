use std::{fmt, path::PathBuf, str::FromStr};

use chrono::{Datelike, Local, NaiveDate};
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "kakebo", version)]
#[command(about = "Kakebo household budgeting: transactions, monthly budgets and reports")]
pub struct Cli {
    /// Optional settings file (TOML), without extension.
    #[arg(long, global = true, default_value = "settings")]
    pub config: String,

    /// Database file (overrides the settings file).
    #[arg(long, global = true, env = "KAKEBO_DATABASE")]
    pub database: Option<PathBuf>,

    /// Open the database without writing to it.
    #[arg(long, global = true)]
    pub read_only: bool,

    /// Database password (prefer `--ask-password`).
    #[arg(long, global = true, env = "KAKEBO_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Prompt for the database password.
    #[arg(long, global = true)]
    pub ask_password: bool,

    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Language for category names (`es` or `en`).
    #[arg(long, global = true)]
    pub locale: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new database file.
    Init(InitArgs),
    /// Check that a database can be opened.
    Check,
    /// Record a transaction.
    Add(AddArgs),
    /// Replace fields of a stored transaction.
    Update(UpdateArgs),
    /// Delete a transaction.
    Delete { id: i32 },
    /// Show one transaction.
    Show { id: i32 },
    /// List transactions.
    List(ListArgs),
    /// Expense breakdown for a month.
    Report(ReportArgs),
    /// Income, expenses and savings rate.
    Balance(BalanceArgs),
    /// Monthly budgets.
    Budget(Budget),
    /// List categories and their Kakebo buckets.
    Categories(CategoriesArgs),
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Where to create the database.
    #[arg(long)]
    pub path: Option<PathBuf>,
    /// Ask for the location interactively.
    #[arg(long, conflicts_with = "path")]
    pub pick: bool,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    pub description: String,
    #[arg(long)]
    pub amount: String,
    /// `income` or `expense`.
    #[arg(long = "type", default_value = "expense")]
    pub kind: String,
    /// Category code; defaults to `salary` for income and `food` for expenses.
    #[arg(long)]
    pub category: Option<String>,
    /// Date as YYYY-MM-DD; defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,
    #[arg(long)]
    pub subcategory: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    pub id: i32,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub amount: Option<String>,
    #[arg(long = "type")]
    pub kind: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub date: Option<NaiveDate>,
    /// Empty string clears the subcategory.
    #[arg(long)]
    pub subcategory: Option<String>,
    /// Empty string clears the notes.
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Month as YYYY-MM.
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub month: Option<YearMonth>,
    #[arg(long, requires = "to")]
    pub from: Option<NaiveDate>,
    #[arg(long, requires = "from")]
    pub to: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Month as YYYY-MM; defaults to the current month.
    #[arg(long)]
    pub month: Option<YearMonth>,
    /// Group by category and subcategory.
    #[arg(long)]
    pub by_subcategory: bool,
}

#[derive(Args, Debug)]
pub struct BalanceArgs {
    /// Month as YYYY-MM; defaults to the current month.
    #[arg(long, conflicts_with = "all")]
    pub month: Option<YearMonth>,
    /// Balance over every transaction.
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct Budget {
    #[command(subcommand)]
    pub command: BudgetCommand,
}

#[derive(Subcommand, Debug)]
pub enum BudgetCommand {
    /// Create or replace the budget of a month.
    Set(BudgetSetArgs),
    /// Planned vs actual for a month.
    Show {
        #[arg(long)]
        month: Option<YearMonth>,
    },
    /// Every stored budget.
    List,
}

#[derive(Args, Debug)]
pub struct BudgetSetArgs {
    #[arg(long)]
    pub month: Option<YearMonth>,
    #[arg(long)]
    pub income: String,
    #[arg(long, default_value = "0")]
    pub survival: String,
    #[arg(long, default_value = "0")]
    pub optional: String,
    #[arg(long, default_value = "0")]
    pub culture: String,
    #[arg(long, default_value = "0")]
    pub unexpected: String,
}

#[derive(Args, Debug)]
pub struct CategoriesArgs {
    /// Only `income` or `expense` categories.
    #[arg(long = "type")]
    pub kind: Option<String>,
    /// Show suggested subcategories.
    #[arg(long)]
    pub subcategories: bool,
}

/// A calendar month written as `YYYY-MM`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn current() -> Self {
        let today = Local::now().date_naive();
        Self {
            year: today.year(),
            month: today.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("invalid month '{s}', expected YYYY-MM");
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) {
            return Err(invalid());
        }
        Ok(Self { year, month })
    }
}
