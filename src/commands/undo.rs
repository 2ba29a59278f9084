use crate::commands::{plural, Out};
use crate::error::{ErrorType, IntoResult};
use crate::ledger::{Ledger, UndoOutcome};
use crate::model::Expense;
use crate::{Config, Result};

/// Reverses the last add or settle on the owed list. Running it again does nothing.
pub async fn undo_owed(config: Config) -> Result<Out<UndoOutcome>> {
    let mut ledger = Ledger::open(&config).await.pub_result(ErrorType::Storage)?;
    let outcome = ledger.undo_owed().await.pub_result(ErrorType::Storage)?;

    let message = match &outcome {
        UndoOutcome::NothingToUndo => "There is no recent owed action to undo.".to_string(),
        UndoOutcome::Add { removed: Some(item) } => format!(
            "Undid last 'add to owed list' action, removed {} owing {}",
            item.who(),
            item.amount()
        ),
        UndoOutcome::Add { removed: None } => {
            "Undid last 'add to owed list' action, the item was already gone.".to_string()
        }
        UndoOutcome::Settle { restored, removed } => format!(
            "Undid last 'paid' action, restored {} and removed {}",
            plural(restored.len(), "owed item", "owed items"),
            plural(removed.len(), "reimbursement", "reimbursements"),
        ),
    };
    Ok(Out::new(message, outcome))
}

/// Removes the most recently recorded expense.
pub async fn undo_expense(config: Config) -> Result<Out<Expense>> {
    let mut ledger = Ledger::open(&config).await.pub_result(ErrorType::Storage)?;
    match ledger
        .undo_last_expense()
        .await
        .pub_result(ErrorType::Storage)?
    {
        Some(expense) => Ok(Out::new(
            format!("Removed {} ({})", expense.description(), expense.amount()),
            expense,
        )),
        None => Ok("Nothing to undo.".into()),
    }
}
