//! The single-step undo slot for owed actions.

use crate::model::{Expense, OwedItem};
use crate::{utils, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// One owed item that was settled, along with the reimbursement expense it produced.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Settlement {
    pub owed: OwedItem,
    pub reimbursement: Expense,
}

/// The most recent action that affected the owed list, holding what is needed to reverse it.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UndoRecord {
    /// An owed item was added.
    Add { item: OwedItem },
    /// A batch of owed items was settled together.
    Settle { items: Vec<Settlement> },
}

/// Holds at most one `UndoRecord` and mirrors it to `undo.json`, so that an undo is still
/// available to the next invocation of the program.
#[derive(Debug, Clone)]
pub struct UndoSlot {
    path: PathBuf,
    record: Option<UndoRecord>,
}

impl UndoSlot {
    /// Loads the slot from `path`. A missing file is an empty slot.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let record = match utils::read_optional(&path).await? {
            None => None,
            Some(json) => Some(
                serde_json::from_str(&json)
                    .with_context(|| format!("Failed to parse undo file at {}", path.display()))?,
            ),
        };
        Ok(Self { path, record })
    }

    pub fn get(&self) -> Option<&UndoRecord> {
        self.record.as_ref()
    }

    /// Replaces whatever is in the slot with `record`.
    pub async fn set(&mut self, record: UndoRecord) -> Result<()> {
        let json = serde_json::to_string_pretty(&record).context("Unable to serialize undo record")?;
        utils::replace(&self.path, json).await?;
        self.record = Some(record);
        debug!("Recorded undo action in {}", self.path.display());
        Ok(())
    }

    /// Empties the slot and returns what was in it.
    pub async fn take(&mut self) -> Result<Option<UndoRecord>> {
        let record = self.record.take();
        utils::remove_if_exists(&self.path).await?;
        Ok(record)
    }
}
