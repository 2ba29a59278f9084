use crate::model::category::deserialize_card;
use crate::model::{Amount, Card, Id, Record};
use crate::Result;
use anyhow::ensure;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub(crate) const OWED_ID_PREFIX: &str = "owe";

/// Represents a single row of the owed file: money that someone owes the user.
// "Who","Description","Card","Amount","Date","Id"
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OwedItem {
    pub(crate) who: String,
    pub(crate) description: String,
    /// The card the user paid with on the other person's behalf.
    #[serde(default, deserialize_with = "deserialize_card")]
    pub(crate) card: Card,
    pub(crate) amount: Amount,
    pub(crate) date: NaiveDate,
    #[serde(default)]
    pub(crate) id: Id,
}

impl OwedItem {
    pub fn who(&self) -> &str {
        &self.who
    }

    pub fn description(&self) -> &str {
        &self.description
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

impl Record for OwedItem {
    const ID_PREFIX: &'static str = OWED_ID_PREFIX;
    const HEADERS: &'static [&'static str] =
        &["Who", "Description", "Card", "Amount", "Date", "Id"];

    fn id(&self) -> &Id {
        &self.id
    }

    fn set_id(&mut self, id: Id) {
        self.id = id;
    }
}

/// A validated request to record that someone owes the user money.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct NewOwedItem {
    who: String,
    description: String,
    card: Card,
    amount: Amount,
    date: NaiveDate,
}

impl NewOwedItem {
    pub fn new(
        who: impl Into<String>,
        description: impl Into<String>,
        card: Card,
        amount: Amount,
        date: NaiveDate,
    ) -> Result<Self> {
        let who = who.into().trim().to_string();
        let description = description.into().trim().to_string();
        let amount = amount.rounded();
        ensure!(
            !who.is_empty() && !description.is_empty() && amount.is_positive(),
            "Please fill in who, what for, and an amount > 0."
        );
        ensure!(
            amount <= Amount::MAX_ENTRY,
            "Amounts larger than {} are not supported.",
            Amount::MAX_ENTRY
        );
        Ok(Self {
            who,
            description,
            card,
            amount,
            date,
        })
    }

    pub(crate) fn into_owed_item(self) -> OwedItem {
        OwedItem {
            who: self.who,
            description: self.description,
            card: self.card,
            amount: self.amount,
            date: self.date,
            id: Id::generate(OWED_ID_PREFIX),
        }
    }
}
