use crate::args::{AddExpenseArgs, AddOwedArgs};
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::ledger::Ledger;
use crate::model::{Expense, NewExpense, NewOwedItem, OwedItem, Record};
use crate::{utils, Config, Result};
use tracing::debug;

/// Records an expense. The date defaults to today.
pub async fn add_expense(config: Config, args: AddExpenseArgs) -> Result<Out<Expense>> {
    let new = NewExpense::new(
        args.description,
        args.category,
        args.card,
        args.amount,
        args.date.unwrap_or_else(utils::today),
    )
    .pub_result(ErrorType::Validation)?;

    let mut ledger = Ledger::open(&config).await.pub_result(ErrorType::Storage)?;
    let expense = ledger
        .add_expense(new)
        .await
        .pub_result(ErrorType::Storage)?;
    debug!("Expenses now hold {} records", ledger.expenses().len());

    Ok(Out::new(
        format!(
            "Expense added and saved: {} ({}), id {}",
            expense.description(),
            expense.amount(),
            expense.id()
        ),
        expense,
    ))
}

/// Records money someone owes. This replaces whatever `undo owed` would have undone.
pub async fn add_owed(config: Config, args: AddOwedArgs) -> Result<Out<OwedItem>> {
    let new = NewOwedItem::new(
        args.who,
        args.description,
        args.card,
        args.amount,
        args.date.unwrap_or_else(utils::today),
    )
    .pub_result(ErrorType::Validation)?;

    let mut ledger = Ledger::open(&config).await.pub_result(ErrorType::Storage)?;
    let item = ledger.add_owed(new).await.pub_result(ErrorType::Storage)?;

    Ok(Out::new(
        format!(
            "Added to the owed list: {} owes {} for {}, id {}. Total owed is now {}",
            item.who(),
            item.amount(),
            item.description(),
            item.id(),
            ledger.total_owed()
        ),
        item,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_type;
    use crate::model::{Amount, Card, Category};
    use crate::test::TestEnv;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn expense_args(description: &str, amount: &str) -> AddExpenseArgs {
        AddExpenseArgs {
            description: description.to_string(),
            category: Category::Food,
            card: Card::Visa,
            amount: Amount::from_str(amount).unwrap(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1),
        }
    }

    fn owed_args(who: &str, amount: &str) -> AddOwedArgs {
        AddOwedArgs {
            who: who.to_string(),
            description: "Dinner".to_string(),
            card: Card::Mastercard,
            amount: Amount::from_str(amount).unwrap(),
            date: None,
        }
    }

    #[tokio::test]
    async fn test_add_expense() {
        let env = TestEnv::new().await;
        let out = add_expense(env.config(), expense_args("  Groceries ", "12.5"))
            .await
            .unwrap();
        let expense = out.structure().unwrap();
        assert_eq!(expense.description(), "Groceries");
        assert!(out.message().contains("£12.50"));

        let ledger = env.ledger().await;
        assert_eq!(ledger.expenses(), &[expense.clone()]);
    }

    #[tokio::test]
    async fn test_add_expense_rejected_without_write() {
        let env = TestEnv::new().await;
        let e = add_expense(env.config(), expense_args("", "5"))
            .await
            .unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::Validation));
        assert!(e.to_string().contains("Enter a description"));

        let e = add_expense(env.config(), expense_args("Snacks", "0"))
            .await
            .unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::Validation));
        assert!(!env.config().expense_path().exists());
    }

    #[tokio::test]
    async fn test_add_owed_defaults_date_and_reports_total() {
        let env = TestEnv::new().await;
        add_owed(env.config(), owed_args("Alice", "20")).await.unwrap();
        let out = add_owed(env.config(), owed_args("Bob", "7.25"))
            .await
            .unwrap();
        assert!(out.message().contains("Total owed is now £27.25"));
        assert_eq!(out.structure().unwrap().date(), utils::today());

        let e = add_owed(env.config(), owed_args(" ", "7")).await.unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::Validation));
        assert_eq!(env.ledger().await.owed().len(), 2);
    }
}
