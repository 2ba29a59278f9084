//! CSV-backed record storage.
//!
//! A `Store` holds one collection of records in memory and mirrors it to a single header-led CSV
//! file. After every mutating call returns successfully, the file holds exactly the in-memory
//! records in list order, or is absent if a rewrite left the collection empty.

use crate::backup::Backup;
use crate::model::{Id, Record};
use crate::{utils, Result};
use anyhow::Context;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct Store<R> {
    path: PathBuf,
    records: Vec<R>,
    backup: Option<Backup>,
}

impl<R: Record> Store<R> {
    /// Reads the CSV file at `path` if it exists. A missing file is an empty collection.
    ///
    /// Rows written before ids existed are given one, and the file is rewritten once so those ids
    /// are stable from then on. Rows missing the card column get `Unknown`. A file whose header is
    /// not the current one is also rewritten, or removed if it holds no rows.
    pub async fn load(path: impl Into<PathBuf>, backup: Option<Backup>) -> Result<Self> {
        let path = path.into();
        let mut store = Self {
            path,
            records: Vec::new(),
            backup,
        };
        let Some(contents) = utils::read_optional(&store.path).await? else {
            debug!("{} does not exist, starting empty", store.path.display());
            return Ok(store);
        };

        let mut backfilled = 0usize;
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(contents.as_bytes());
        let stale_header = !rdr
            .headers()
            .with_context(|| format!("Unable to read the header of {}", store.path.display()))?
            .iter()
            .eq(R::HEADERS.iter().copied());
        for (ix, result) in rdr.deserialize().enumerate() {
            let mut record: R = result.with_context(|| {
                format!("Unable to parse row {} of {}", ix + 2, store.path.display())
            })?;
            if record.id().is_empty() {
                record.set_id(Id::generate(R::ID_PREFIX));
                backfilled += 1;
            }
            store.records.push(record);
        }

        if backfilled > 0 {
            info!(
                "Assigned ids to {backfilled} row{} of {}",
                if backfilled == 1 { "" } else { "s" },
                store.path.display()
            );
        }
        // A file with an outdated header would have new rows appended under it.
        if backfilled > 0 || stale_header {
            store.rewrite_all().await?;
        }
        debug!(
            "Loaded {} records from {}",
            store.records.len(),
            store.path.display()
        );
        Ok(store)
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn contains(&self, id: &Id) -> bool {
        self.records.iter().any(|r| r.id() == id)
    }

    /// Adds `record` to the end of the collection, then appends one row to the file, writing the
    /// header first if the file did not exist.
    pub async fn append(&mut self, record: R) -> Result<()> {
        self.records.push(record);
        let record = &self.records[self.records.len() - 1];

        let needs_header = matches!(utils::file_len(&self.path).await?, None | Some(0));
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        if needs_header {
            wtr.write_record(R::HEADERS)
                .context("Unable to write CSV header")?;
        }
        wtr.serialize(record)
            .with_context(|| format!("Unable to serialize record {}", record.id()))?;
        let bytes = wtr.into_inner().context("Unable to flush CSV writer")?;

        utils::append(&self.path, bytes).await?;
        debug!("Appended {} to {}", record.id(), self.path.display());
        Ok(())
    }

    /// Truncates and rewrites the whole file from the in-memory records, or deletes the file if
    /// there are no records. The previous file is backed up first when backups are enabled.
    pub async fn rewrite_all(&self) -> Result<()> {
        if let Some(backup) = &self.backup {
            backup.save_copy(&self.path).await?;
        }

        if self.records.is_empty() {
            if utils::remove_if_exists(&self.path).await? {
                debug!("Removed {}, no records remain", self.path.display());
            }
            return Ok(());
        }

        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        wtr.write_record(R::HEADERS)
            .context("Unable to write CSV header")?;
        for record in &self.records {
            wtr.serialize(record)
                .with_context(|| format!("Unable to serialize record {}", record.id()))?;
        }
        let bytes = wtr.into_inner().context("Unable to flush CSV writer")?;

        utils::replace(&self.path, bytes).await?;
        debug!(
            "Rewrote {} with {} records",
            self.path.display(),
            self.records.len()
        );
        Ok(())
    }

    /// Removes the last record, if any, and rewrites the file.
    pub async fn remove_last(&mut self) -> Result<Option<R>> {
        let Some(removed) = self.records.pop() else {
            return Ok(None);
        };
        self.rewrite_all().await?;
        Ok(Some(removed))
    }

    /// Removes the record with the given id and rewrites the file. Returns `None`, and leaves the
    /// file alone, when there is no such record.
    pub async fn remove(&mut self, id: &Id) -> Result<Option<R>> {
        let Some(ix) = self.records.iter().position(|r| r.id() == id) else {
            return Ok(None);
        };
        let removed = self.records.remove(ix);
        self.rewrite_all().await?;
        Ok(Some(removed))
    }

    /// Removes every record whose id is in `ids` with a single rewrite. Returns the removed
    /// records in collection order.
    pub async fn remove_many(&mut self, ids: &[Id]) -> Result<Vec<R>> {
        let wanted: BTreeSet<&Id> = ids.iter().collect();
        let (removed, kept): (Vec<R>, Vec<R>) = std::mem::take(&mut self.records)
            .into_iter()
            .partition(|r| wanted.contains(r.id()));
        self.records = kept;
        if !removed.is_empty() {
            self.rewrite_all().await?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, Card, Category, Expense, NewExpense, NewOwedItem, OwedItem};
    use chrono::NaiveDate;
    use std::path::Path;
    use std::str::FromStr;
    use tempfile::TempDir;

    fn expense(description: &str, amount: &str) -> Expense {
        NewExpense::new(
            description,
            Category::Food,
            Card::Visa,
            Amount::from_str(amount).unwrap(),
            NaiveDate::from_str("2024-01-01").unwrap(),
        )
        .unwrap()
        .into_expense()
    }

    fn owed(who: &str) -> OwedItem {
        NewOwedItem::new(
            who,
            "Dinner",
            Card::Cash,
            Amount::from_str("20").unwrap(),
            NaiveDate::from_str("2024-01-01").unwrap(),
        )
        .unwrap()
        .into_owed_item()
    }

    async fn line_count(path: &Path) -> usize {
        utils::read(path).await.unwrap().lines().count()
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store: Store<Expense> = Store::load(dir.path().join("expenses.csv"), None)
            .await
            .unwrap();
        assert!(store.records().is_empty());
        assert!(!dir.path().join("expenses.csv").exists());
    }

    #[tokio::test]
    async fn test_append_writes_header_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("expenses.csv");
        let mut store: Store<Expense> = Store::load(&path, None).await.unwrap();

        store.append(expense("Groceries", "12.5")).await.unwrap();
        store.append(expense("Rent", "900")).await.unwrap();

        let contents = utils::read(&path).await.unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Description,Category,Card,Amount,Date,Id");
        assert!(lines[1].starts_with("Groceries,Food,Visa,12.50,2024-01-01,exp-"));
        assert!(lines[2].starts_with("Rent,Food,Visa,900.00,2024-01-01,exp-"));
    }

    #[tokio::test]
    async fn test_round_trip_through_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("owed.csv");
        let mut store: Store<OwedItem> = Store::load(&path, None).await.unwrap();
        let alice = owed("Alice");
        store.append(alice.clone()).await.unwrap();

        let reloaded: Store<OwedItem> = Store::load(&path, None).await.unwrap();
        assert_eq!(reloaded.records(), &[alice]);
    }

    #[tokio::test]
    async fn test_remove_rewrites_and_empty_deletes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("owed.csv");
        let mut store: Store<OwedItem> = Store::load(&path, None).await.unwrap();
        let alice = owed("Alice");
        let bob = owed("Bob");
        store.append(alice.clone()).await.unwrap();
        store.append(bob.clone()).await.unwrap();

        let removed = store.remove(alice.id()).await.unwrap();
        assert_eq!(removed.as_ref(), Some(&alice));
        assert_eq!(line_count(&path).await, 2);
        assert_eq!(store.records(), &[bob.clone()]);

        assert!(store.remove(alice.id()).await.unwrap().is_none());

        store.remove_last().await.unwrap();
        assert!(store.records().is_empty());
        assert!(!path.exists());

        assert!(store.remove_last().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_many_keeps_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("owed.csv");
        let mut store: Store<OwedItem> = Store::load(&path, None).await.unwrap();
        let items: Vec<OwedItem> = ["A", "B", "C", "D"].iter().map(|w| owed(w)).collect();
        for item in &items {
            store.append(item.clone()).await.unwrap();
        }

        let ids = vec![items[2].id().clone(), items[0].id().clone()];
        let removed = store.remove_many(&ids).await.unwrap();
        assert_eq!(removed, vec![items[0].clone(), items[2].clone()]);
        assert_eq!(store.records(), &[items[1].clone(), items[3].clone()]);

        let reloaded: Store<OwedItem> = Store::load(&path, None).await.unwrap();
        assert_eq!(reloaded.records(), store.records());
    }

    #[tokio::test]
    async fn test_load_legacy_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("expenses.csv");
        let legacy = "Description,Category,Amount,Date\n\
                      Groceries,Food,12.0,2023-11-02\n\
                      Uber,Transport,8.5,2023-11-03\n";
        utils::write(&path, legacy).await.unwrap();

        let store: Store<Expense> = Store::load(&path, None).await.unwrap();
        assert_eq!(store.records().len(), 2);
        assert_eq!(store.records()[0].card(), Card::Unknown);
        assert_eq!(store.records()[1].category(), Category::Transport);
        assert!(store.records().iter().all(|e| !e.id().is_empty()));

        // The ids were written back, so a second load sees the same ones.
        let reloaded: Store<Expense> = Store::load(&path, None).await.unwrap();
        assert_eq!(reloaded.records(), store.records());
        let header = utils::read(&path).await.unwrap();
        assert!(header.starts_with("Description,Category,Card,Amount,Date,Id\n"));
    }

    #[tokio::test]
    async fn test_append_to_legacy_file_after_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("owed.csv");
        utils::write(&path, "Who,Description,Card,Amount,Date\nAlice,Dinner,,20.0,2024-01-01\n")
            .await
            .unwrap();

        let mut store: Store<OwedItem> = Store::load(&path, None).await.unwrap();
        assert_eq!(store.records()[0].card(), Card::Unknown);
        store.append(owed("Bob")).await.unwrap();

        let reloaded: Store<OwedItem> = Store::load(&path, None).await.unwrap();
        assert_eq!(reloaded.records().len(), 2);
        assert_eq!(reloaded.records()[1].who(), "Bob");
    }

    #[tokio::test]
    async fn test_header_only_legacy_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("expenses.csv");
        utils::write(&path, "Description,Category,Amount,Date\n")
            .await
            .unwrap();

        let mut store: Store<Expense> = Store::load(&path, None).await.unwrap();
        assert!(store.records().is_empty());
        assert!(!path.exists());

        store.append(expense("Lunch", "5")).await.unwrap();
        let reloaded: Store<Expense> = Store::load(&path, None).await.unwrap();
        assert_eq!(reloaded.records(), store.records());
        let contents = utils::read(&path).await.unwrap();
        assert!(contents.starts_with("Description,Category,Card,Amount,Date,Id\n"));
    }

    #[tokio::test]
    async fn test_legacy_header_with_ids_is_rewritten() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("owed.csv");
        utils::write(
            &path,
            "Who,Description,Amount,Date,Id\nAlice,Dinner,20.00,2024-01-01,owe-1\n",
        )
        .await
        .unwrap();

        let mut store: Store<OwedItem> = Store::load(&path, None).await.unwrap();
        assert_eq!(store.records()[0].id().as_str(), "owe-1");
        store.append(owed("Bob")).await.unwrap();

        let reloaded: Store<OwedItem> = Store::load(&path, None).await.unwrap();
        assert_eq!(reloaded.records(), store.records());
        assert_eq!(line_count(&path).await, 3);
    }

    #[tokio::test]
    async fn test_load_bad_row_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("expenses.csv");
        utils::write(
            &path,
            "Description,Category,Card,Amount,Date\nLunch,Food,Visa,lots,2024-01-01\n",
        )
        .await
        .unwrap();
        let e = Store::<Expense>::load(&path, None).await.unwrap_err();
        assert!(e.to_string().contains("row 2"));
    }

    #[tokio::test]
    async fn test_rewrite_takes_backup() {
        let dir = TempDir::new().unwrap();
        let backups = dir.path().join(".backups");
        utils::make_dir(&backups).await.unwrap();
        let path = dir.path().join("owed.csv");
        let mut store: Store<OwedItem> =
            Store::load(&path, Some(Backup::new(&backups, 5))).await.unwrap();
        store.append(owed("Alice")).await.unwrap();
        store.remove_last().await.unwrap();

        let mut rd = utils::read_dir(&backups).await.unwrap();
        let entry = rd.next_entry().await.unwrap().unwrap();
        assert!(entry.file_name().to_string_lossy().starts_with("owed.csv."));
        assert!(rd.next_entry().await.unwrap().is_none());
    }
}
