//! These structs provide the CLI interface for the expenses CLI.

use crate::model::{Amount, Card, Category, Id};
use chrono::NaiveDate;
use clap::{Args as ClapArgs, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// expenses: A command-line tool for tracking what you spend and what you are owed.
///
/// Expenses and money that other people owe you are kept in two CSV files in a data directory
/// ($EXPENSES_HOME, by default ~/expenses). When someone pays you back, mark their debt as paid
/// with `settle` and a reimbursement is recorded for you. The last change to the owed list can
/// be undone with `undo owed`.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and its configuration file.
    ///
    /// Existing expenses.csv and owed.csv files in the directory are picked up as they are.
    Init,
    /// Record an expense, or money that someone owes you.
    #[command(subcommand)]
    Add(AddSubcommand),
    /// Mark owed items as paid. Each one becomes a reimbursement expense.
    Settle(SettleArgs),
    /// Undo the last change to the owed list, or remove the last expense.
    Undo(UndoArgs),
    /// Show expenses or owed items.
    #[command(subcommand)]
    List(ListSubcommand),
    /// Show daily and per-category totals.
    Report(ReportArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where expense data and configuration is held. Defaults to ~/expenses
    #[arg(long, env = "EXPENSES_HOME", default_value_t = default_expenses_home())]
    expenses_home: DisplayPath,
}

impl Common {
    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn expenses_home(&self) -> &DisplayPath {
        &self.expenses_home
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum AddSubcommand {
    /// Record something you spent money on.
    Expense(AddExpenseArgs),
    /// Record money that someone owes you.
    Owed(AddOwedArgs),
}

/// Args for the `expenses add expense` command.
#[derive(Debug, ClapArgs, Clone)]
pub struct AddExpenseArgs {
    /// What the money was spent on, e.g. Groceries, Uber, Rent
    #[arg(long)]
    pub description: String,

    #[arg(long, value_enum)]
    pub category: Category,

    /// The card used to pay
    #[arg(long, value_enum)]
    pub card: Card,

    /// The amount spent, e.g. 12.50 or £1,200
    #[arg(long)]
    pub amount: Amount,

    /// The date of the expense as YYYY-MM-DD. Defaults to today
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

/// Args for the `expenses add owed` command.
#[derive(Debug, ClapArgs, Clone)]
pub struct AddOwedArgs {
    /// Who owes you, e.g. Alice
    #[arg(long)]
    pub who: String,

    /// What it is for, e.g. Dinner split
    #[arg(long)]
    pub description: String,

    /// The card you used to pay
    #[arg(long, value_enum)]
    pub card: Card,

    /// The amount they owe
    #[arg(long)]
    pub amount: Amount,

    /// The date of the original expense as YYYY-MM-DD. Defaults to today
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

/// Args for the `expenses settle` command.
#[derive(Debug, ClapArgs, Clone)]
pub struct SettleArgs {
    /// The ids of the owed items that have been paid, as shown by `expenses list owed`. All of
    /// them are settled together and can be undone together.
    #[arg(required = true, num_args = 1..)]
    ids: Vec<Id>,
}

impl SettleArgs {
    pub fn new<S: AsRef<str>>(ids: impl IntoIterator<Item = S>) -> Self {
        Self {
            ids: ids.into_iter().map(|s| Id::from(s.as_ref())).collect(),
        }
    }

    pub fn ids(&self) -> &[Id] {
        &self.ids
    }
}

/// What to undo.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum UndoTarget {
    /// The last add or settle on the owed list.
    #[default]
    Owed,
    /// The most recently added expense, whatever it was.
    Expense,
}

serde_plain::derive_display_from_serialize!(UndoTarget);
serde_plain::derive_fromstr_from_deserialize!(UndoTarget);

/// Args for the `expenses undo` command.
#[derive(Debug, ClapArgs, Clone)]
pub struct UndoArgs {
    /// "owed" or "expense"
    #[arg(value_enum, default_value_t = UndoTarget::Owed)]
    target: UndoTarget,
}

impl UndoArgs {
    pub fn new(target: UndoTarget) -> Self {
        Self { target }
    }

    pub fn target(&self) -> UndoTarget {
        self.target
    }
}

/// The output format of `list` and `report`.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// A markdown table
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
    /// CSV with a header row
    Csv,
}

serde_plain::derive_display_from_serialize!(OutputFormat);
serde_plain::derive_fromstr_from_deserialize!(OutputFormat);

/// Year, month and card filters.
#[derive(Debug, Default, ClapArgs, Clone)]
pub struct FilterArgs {
    /// Only show this year. Defaults to the most recent year with expenses
    #[arg(long)]
    pub year: Option<i32>,

    /// Only show this month, 1-12
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,

    /// Only show expenses paid with this card
    #[arg(long, value_enum)]
    pub card: Option<Card>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ListSubcommand {
    /// Show expenses, sorted by date.
    Expenses(ListExpensesArgs),
    /// Show what people owe you, with the total.
    Owed(ListOwedArgs),
}

/// Args for the `expenses list expenses` command.
#[derive(Debug, Default, ClapArgs, Clone)]
pub struct ListExpensesArgs {
    #[clap(flatten)]
    pub filter: FilterArgs,

    /// Show every expense instead of filtering by year, month and card
    #[arg(long, conflicts_with_all = ["year", "month", "card"])]
    pub all: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

/// Args for the `expenses list owed` command.
#[derive(Debug, Default, ClapArgs, Clone)]
pub struct ListOwedArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

/// Args for the `expenses report` command.
#[derive(Debug, Default, ClapArgs, Clone)]
pub struct ReportArgs {
    #[clap(flatten)]
    pub filter: FilterArgs,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

fn default_expenses_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("expenses"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --expenses-home or EXPENSES_HOME instead of relying on the \
                default directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("expenses")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        <Args as CommandFactory>::command().debug_assert();
    }

    #[test]
    fn test_parse_add_owed() {
        let args = Args::try_parse_from([
            "expenses",
            "--expenses-home",
            "/tmp/x",
            "add",
            "owed",
            "--who",
            "Alice",
            "--description",
            "Dinner",
            "--card",
            "cash",
            "--amount",
            "£20.00",
            "--date",
            "2024-01-01",
        ])
        .unwrap();
        assert_eq!(args.common().expenses_home().path(), Path::new("/tmp/x"));
        let Command::Add(AddSubcommand::Owed(owed)) = args.command() else {
            panic!("expected add owed, got {:?}", args.command());
        };
        assert_eq!(owed.who, "Alice");
        assert_eq!(owed.card, Card::Cash);
        assert_eq!(owed.amount, Amount::from_str("20").unwrap());
        assert_eq!(owed.date, NaiveDate::from_ymd_opt(2024, 1, 1));
    }

    #[test]
    fn test_reimbursement_category_rejected() {
        let result = Args::try_parse_from([
            "expenses",
            "add",
            "expense",
            "--description",
            "x",
            "--category",
            "reimbursement",
            "--card",
            "visa",
            "--amount",
            "1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_settle_and_undo() {
        let args = Args::try_parse_from(["expenses", "settle", "owe-1", "owe-2"]).unwrap();
        let Command::Settle(settle) = args.command() else {
            panic!("expected settle");
        };
        assert_eq!(settle.ids(), &[Id::from("owe-1"), Id::from("owe-2")]);

        assert!(Args::try_parse_from(["expenses", "settle"]).is_err());

        let args = Args::try_parse_from(["expenses", "undo"]).unwrap();
        let Command::Undo(undo) = args.command() else {
            panic!("expected undo");
        };
        assert_eq!(undo.target(), UndoTarget::Owed);

        let args = Args::try_parse_from(["expenses", "undo", "expense"]).unwrap();
        let Command::Undo(undo) = args.command() else {
            panic!("expected undo");
        };
        assert_eq!(undo.target(), UndoTarget::Expense);
    }

    #[test]
    fn test_month_range() {
        assert!(Args::try_parse_from(["expenses", "report", "--month", "13"]).is_err());
        assert!(Args::try_parse_from(["expenses", "report", "--month", "12"]).is_ok());
    }
}
