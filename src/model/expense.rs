use crate::model::category::deserialize_card;
use crate::model::{Amount, Card, Category, Id, OwedItem, Record};
use crate::Result;
use anyhow::ensure;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub(crate) const EXPENSE_ID_PREFIX: &str = "exp";

/// Represents a single row of the expenses file.
// "Description","Category","Card","Amount","Date","Id"
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Expense {
    pub(crate) description: String,
    pub(crate) category: Category,
    #[serde(default, deserialize_with = "deserialize_card")]
    pub(crate) card: Card,
    pub(crate) amount: Amount,
    pub(crate) date: NaiveDate,
    #[serde(default)]
    pub(crate) id: Id,
}

impl Expense {
    /// Builds the reimbursement expense for an owed item that has been paid back on `date`.
    pub fn reimbursement(owed: &OwedItem, date: NaiveDate) -> Self {
        Self {
            description: format!(
                "Reimbursement from {} - {}",
                owed.who(),
                owed.description()
            ),
            category: Category::Reimbursement,
            card: owed.card(),
            amount: owed.amount(),
            date,
            id: Id::generate(EXPENSE_ID_PREFIX),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn card(&self) -> Card {
        self.card
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Record for Expense {
    const ID_PREFIX: &'static str = EXPENSE_ID_PREFIX;
    const HEADERS: &'static [&'static str] =
        &["Description", "Category", "Card", "Amount", "Date", "Id"];

    fn id(&self) -> &Id {
        &self.id
    }

    fn set_id(&mut self, id: Id) {
        self.id = id;
    }
}

/// A validated request to record an expense.
///
/// Construction fails if the description is blank or the amount is not greater than zero, so a
/// `NewExpense` can be added to the ledger without further checks.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct NewExpense {
    description: String,
    category: Category,
    card: Card,
    amount: Amount,
    date: NaiveDate,
}

impl NewExpense {
    pub fn new(
        description: impl Into<String>,
        category: Category,
        card: Card,
        amount: Amount,
        date: NaiveDate,
    ) -> Result<Self> {
        let description = description.into().trim().to_string();
        let amount = amount.rounded();
        ensure!(
            !description.is_empty() && amount.is_positive(),
            "Enter a description and an amount greater than zero."
        );
        ensure!(
            amount <= Amount::MAX_ENTRY,
            "Amounts larger than {} are not supported.",
            Amount::MAX_ENTRY
        );
        ensure!(
            category != Category::Reimbursement,
            "Reimbursements are recorded by settling an owed item."
        );
        Ok(Self {
            description,
            category,
            card,
            amount,
            date,
        })
    }

    pub(crate) fn into_expense(self) -> Expense {
        Expense {
            description: self.description,
            category: self.category,
            card: self.card,
            amount: self.amount,
            date: self.date,
            id: Id::generate(EXPENSE_ID_PREFIX),
        }
    }
}
