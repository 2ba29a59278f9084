//! The application state: both record collections and the undo slot.
//!
//! A `Ledger` is opened at the start of a command, mutated through `&mut self`, and dropped when
//! the command finishes. Every mutation has been written to disk by the time it returns.

use crate::model::{Amount, Expense, Id, NewExpense, NewOwedItem, OwedItem, Record};
use crate::store::Store;
use crate::undo::{Settlement, UndoRecord, UndoSlot};
use crate::{Config, Result};
use anyhow::bail;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

/// What happened when the last owed action was undone.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UndoOutcome {
    /// The slot was empty.
    NothingToUndo,
    /// An added owed item was removed. `removed` is `None` if it was no longer in the list.
    Add { removed: Option<OwedItem> },
    /// A settled batch was reversed.
    Settle {
        /// Owed items put back on the list.
        restored: Vec<OwedItem>,
        /// Reimbursement expenses removed. Reimbursements that no longer existed are skipped.
        removed: Vec<Expense>,
    },
}

#[derive(Debug)]
pub struct Ledger {
    expenses: Store<Expense>,
    owed: Store<OwedItem>,
    undo: UndoSlot,
}

impl Ledger {
    /// Loads both data files and the undo slot for the data directory described by `config`.
    pub async fn open(config: &Config) -> Result<Self> {
        let expenses = Store::load(config.expense_path(), config.backup()).await?;
        let owed = Store::load(config.owed_path(), config.backup()).await?;
        let undo = UndoSlot::load(config.undo_path()).await?;
        Ok(Self {
            expenses,
            owed,
            undo,
        })
    }

    pub fn expenses(&self) -> &[Expense] {
        self.expenses.records()
    }

    pub fn owed(&self) -> &[OwedItem] {
        self.owed.records()
    }

    /// The sum of everything currently owed to the user.
    pub fn total_owed(&self) -> Amount {
        self.owed().iter().map(OwedItem::amount).sum()
    }

    /// The action that `undo_owed` would reverse, if any.
    pub fn last_owed_action(&self) -> Option<&UndoRecord> {
        self.undo.get()
    }

    /// Records a new expense. Expenses do not touch the undo slot.
    pub async fn add_expense(&mut self, new: NewExpense) -> Result<Expense> {
        let expense = new.into_expense();
        self.expenses.append(expense.clone()).await?;
        info!(
            "Added expense {} '{}' for {}",
            expense.id(),
            expense.description(),
            expense.amount()
        );
        Ok(expense)
    }

    /// Records that someone owes the user money. This becomes the undoable owed action.
    pub async fn add_owed(&mut self, new: NewOwedItem) -> Result<OwedItem> {
        let item = new.into_owed_item();
        self.owed.append(item.clone()).await?;
        self.undo.set(UndoRecord::Add { item: item.clone() }).await?;
        info!(
            "{} owes {} for '{}' ({})",
            item.who(),
            item.amount(),
            item.description(),
            item.id()
        );
        Ok(item)
    }

    /// Fails if any of `ids` is not on the owed list. Nothing is changed either way.
    pub fn check_owed_ids(&self, ids: &[Id]) -> Result<()> {
        if ids.is_empty() {
            bail!("No owed items were given to mark as paid");
        }
        let missing: Vec<&str> = ids
            .iter()
            .filter(|id| !self.owed.contains(id))
            .map(Id::as_str)
            .collect();
        if !missing.is_empty() {
            bail!("No owed item with id {}", missing.join(", "));
        }
        Ok(())
    }

    /// Marks the owed items with the given ids as paid on `today`.
    ///
    /// Each item becomes a `Reimbursement` expense, appended in owed-list order, and all of the
    /// items are removed from the owed list with a single rewrite. The whole batch is recorded as
    /// one undoable action. Repeated ids are settled once. If any id is unknown, nothing changes.
    pub async fn settle(&mut self, ids: &[Id], today: NaiveDate) -> Result<Vec<Settlement>> {
        self.check_owed_ids(ids)?;

        let to_settle: Vec<OwedItem> = self
            .owed()
            .iter()
            .filter(|item| ids.contains(item.id()))
            .cloned()
            .collect();

        let mut settlements = Vec::with_capacity(to_settle.len());
        for owed in to_settle {
            let reimbursement = Expense::reimbursement(&owed, today);
            self.expenses.append(reimbursement.clone()).await?;
            debug!(
                "Settled {} with reimbursement {}",
                owed.id(),
                reimbursement.id()
            );
            settlements.push(Settlement {
                owed,
                reimbursement,
            });
        }

        let settled_ids: Vec<Id> = settlements.iter().map(|s| s.owed.id().clone()).collect();
        self.owed.remove_many(&settled_ids).await?;

        self.undo
            .set(UndoRecord::Settle {
                items: settlements.clone(),
            })
            .await?;
        info!(
            "Marked {} owed item{} as paid",
            settlements.len(),
            if settlements.len() == 1 { "" } else { "s" }
        );
        Ok(settlements)
    }

    /// Reverses the last owed action, once. Records that can no longer be found are skipped.
    pub async fn undo_owed(&mut self) -> Result<UndoOutcome> {
        let Some(record) = self.undo.get().cloned() else {
            return Ok(UndoOutcome::NothingToUndo);
        };

        let outcome = match record {
            UndoRecord::Add { item } => {
                let removed = self.owed.remove(item.id()).await?;
                if removed.is_none() {
                    debug!("Owed item {} was already gone, nothing removed", item.id());
                }
                UndoOutcome::Add { removed }
            }
            UndoRecord::Settle { items } => {
                let mut restored = Vec::with_capacity(items.len());
                let mut reimbursement_ids = Vec::with_capacity(items.len());
                for Settlement {
                    owed,
                    reimbursement,
                } in items
                {
                    if self.owed.contains(owed.id()) {
                        debug!("Owed item {} is already on the list", owed.id());
                    } else {
                        self.owed.append(owed.clone()).await?;
                        restored.push(owed);
                    }
                    reimbursement_ids.push(reimbursement.id().clone());
                }
                let removed = self.expenses.remove_many(&reimbursement_ids).await?;
                if removed.len() < reimbursement_ids.len() {
                    debug!(
                        "{} reimbursement(s) were already gone",
                        reimbursement_ids.len() - removed.len()
                    );
                }
                UndoOutcome::Settle { restored, removed }
            }
        };

        self.undo.take().await?;
        Ok(outcome)
    }

    /// Removes the most recently added expense, whatever it was. This is unrelated to the owed
    /// undo slot, which may still refer to the removed expense afterwards.
    pub async fn undo_last_expense(&mut self) -> Result<Option<Expense>> {
        let removed = self.expenses.remove_last().await?;
        if let Some(expense) = &removed {
            info!("Removed expense {} '{}'", expense.id(), expense.description());
        }
        Ok(removed)
    }
}
