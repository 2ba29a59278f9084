use crate::utils;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// A stable, opaque record identifier, e.g. `owe-5b1e...`.
///
/// Identifiers are assigned when a record is created and never change. Rows that were written
/// before identifiers existed deserialize with an empty `Id` and are given one when loaded.
#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    pub(crate) fn generate(prefix: &str) -> Self {
        Self(utils::generate_id(prefix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Id {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().to_string()))
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A row in one of the CSV data files.
pub trait Record: Debug + Clone + Serialize + DeserializeOwned {
    /// Prefix used when generating ids for this kind of record.
    const ID_PREFIX: &'static str;

    /// The column headers, in file order.
    const HEADERS: &'static [&'static str];

    fn id(&self) -> &Id;

    fn set_id(&mut self, id: Id);
}
