use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// The category of an expense.
///
/// `Reimbursement` cannot be chosen when adding an expense. It is assigned to the expense that is
/// generated when an owed item is settled.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
pub enum Category {
    Food,
    Transport,
    Entertainment,
    Bills,
    Shopping,
    #[default]
    Other,
    #[value(skip)]
    Reimbursement,
}

serde_plain::derive_display_from_serialize!(Category);
serde_plain::derive_fromstr_from_deserialize!(Category);

/// The payment card used for an expense, or used to pay for something that is owed back.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
pub enum Card {
    Visa,
    Mastercard,
    Amex,
    Debit,
    Cash,
    Other,
    /// Rows written before the card column existed.
    #[default]
    #[value(skip)]
    Unknown,
}

serde_plain::derive_display_from_serialize!(Card);
serde_plain::derive_fromstr_from_deserialize!(Card);

/// Deserializes a `Card`, treating a blank cell the same as a missing column.
pub(crate) fn deserialize_card<'de, D>(deserializer: D) -> Result<Card, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    let s = s.trim();
    if s.is_empty() {
        return Ok(Card::Unknown);
    }
    Card::from_str(s).map_err(serde::de::Error::custom)
}
