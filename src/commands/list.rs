use crate::args::{ListExpensesArgs, ListOwedArgs};
use crate::commands::output::Table;
use crate::commands::{plural, Out, Rows};
use crate::error::{ErrorType, IntoResult};
use crate::ledger::Ledger;
use crate::model::{Amount, Expense, Record};
use crate::report::Filter;
use crate::{Config, Result};

/// Shows expenses sorted by date, narrowed by the year, month and card filters unless `--all` is
/// given.
pub async fn list_expenses(config: Config, args: ListExpensesArgs) -> Result<Out<Rows>> {
    let ledger = Ledger::open(&config).await.pub_result(ErrorType::Storage)?;
    let expenses = ledger.expenses();

    let filter = if args.all {
        Filter::all()
    } else {
        Filter::new(args.filter.year, args.filter.month, args.filter.card).resolve(expenses)
    };
    let matched: Vec<Expense> = filter.apply(expenses).into_iter().cloned().collect();

    let mut table = Table::new(["Date", "Description", "Category", "Card", "Amount", "Id"]);
    for e in &matched {
        table.push([
            e.date().to_string(),
            e.description().to_string(),
            e.category().to_string(),
            e.card().to_string(),
            e.amount().to_string(),
            e.id().to_string(),
        ]);
    }
    let rows = Rows::render(args.format, &table, &matched).pub_result(ErrorType::Request)?;

    let message = if expenses.is_empty() {
        "No expenses recorded yet.".to_string()
    } else if matched.is_empty() {
        format!("No expenses for {}", filter.describe())
    } else {
        format!(
            "{}: {} totalling {}",
            filter.describe(),
            plural(matched.len(), "expense", "expenses"),
            matched.iter().map(Expense::amount).sum::<Amount>()
        )
    };
    Ok(Out::new(message, rows))
}

/// Shows everything people owe, in the order it was recorded, with the total.
pub async fn list_owed(config: Config, args: ListOwedArgs) -> Result<Out<Rows>> {
    let ledger = Ledger::open(&config).await.pub_result(ErrorType::Storage)?;
    let owed = ledger.owed();

    let mut table = Table::new(["Id", "Who", "Description", "Card", "Amount", "Date"]);
    for item in owed {
        table.push([
            item.id().to_string(),
            item.who().to_string(),
            item.description().to_string(),
            item.card().to_string(),
            item.amount().to_string(),
            item.date().to_string(),
        ]);
    }
    let rows = Rows::render(args.format, &table, &owed).pub_result(ErrorType::Request)?;

    let message = if owed.is_empty() {
        "No one owes you money right now.".to_string()
    } else {
        format!("Total people owe you: {}", ledger.total_owed())
    };
    Ok(Out::new(message, rows))
}
