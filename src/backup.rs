//! Backup management for the data files.
//!
//! Appending a row never takes a backup. Rewriting a whole file does, because a rewrite is the
//! only operation that can lose rows that were already on disk.

use crate::{utils, Result};
use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Manages backup file creation and rotation.
///
/// The `Backup` struct is immutable and owns copies of the paths and settings it needs.
/// Create a new instance via `Config::backup()` or `Backup::new()`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Backup {
    backups_dir: PathBuf,
    backup_copies: u32,
}

impl Backup {
    pub fn new(backups_dir: impl Into<PathBuf>, backup_copies: u32) -> Self {
        Self {
            backups_dir: backups_dir.into(),
            backup_copies,
        }
    }

    /// Copies `source` into the backups directory.
    ///
    /// The filename format is `{file_name}.YYYY-MM-DD-NNN` where NNN is a sequence number.
    /// Automatically rotates old backups, keeping only `backup_copies` files per source file.
    ///
    /// Returns the path to the created backup file, or `None` if `source` does not exist.
    pub async fn save_copy(&self, source: &Path) -> Result<Option<PathBuf>> {
        if utils::file_len(source).await?.is_none() {
            return Ok(None);
        }
        let prefix = source
            .file_name()
            .with_context(|| format!("Cannot back up '{}', it has no file name", source.display()))?
            .to_string_lossy()
            .to_string();

        let date = today();
        let seq = self.next_sequence_number(&prefix, &date).await?;
        let path = self.backups_dir.join(format!("{prefix}.{date}-{seq:03}"));

        utils::copy(source, &path).await?;
        debug!("Saved backup of {} to {}", source.display(), path.display());

        self.rotate(&prefix).await?;
        Ok(Some(path))
    }

    /// Scans the backups directory for existing files with the given prefix and date,
    /// and returns the next sequence number.
    async fn next_sequence_number(&self, prefix: &str, date: &str) -> Result<u32> {
        let mut max_seq: u32 = 0;

        let mut dir = utils::read_dir(&self.backups_dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy();
            if let Some(seq) = parse_sequence_number(&name, prefix, date) {
                max_seq = max_seq.max(seq);
            }
        }

        Ok(max_seq + 1)
    }

    /// Rotates old backup files, keeping only `backup_copies` files with the given prefix.
    async fn rotate(&self, prefix: &str) -> Result<()> {
        let mut files: Vec<(PathBuf, String)> = Vec::new();

        let mut dir = utils::read_dir(&self.backups_dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            if is_backup_file(&name, prefix) {
                files.push((entry.path(), name));
            }
        }

        // Sort by filename (which sorts by date and sequence number due to format)
        files.sort_by(|a, b| a.1.cmp(&b.1));

        let to_delete = files.len().saturating_sub(self.backup_copies as usize);
        for (path, _) in files.into_iter().take(to_delete) {
            debug!("Removing old backup {}", path.display());
            utils::remove(&path).await?;
        }

        Ok(())
    }
}

/// Returns today's date in YYYY-MM-DD format.
fn today() -> String {
    utils::today().format("%Y-%m-%d").to_string()
}

/// Parses the sequence number from a backup filename with the given prefix and date.
/// Returns None if the filename doesn't match the expected pattern.
fn parse_sequence_number(filename: &str, prefix: &str, date: &str) -> Option<u32> {
    let expected_start = format!("{prefix}.{date}-");
    let seq = filename.strip_prefix(&expected_start)?;
    if seq.len() < 3 || !seq.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    seq.parse().ok()
}

/// Checks if a filename is a backup of the file named `prefix`, i.e. `{prefix}.YYYY-MM-DD-NNN`.
fn is_backup_file(filename: &str, prefix: &str) -> bool {
    let Some(rest) = filename.strip_prefix(&format!("{prefix}.")) else {
        return false;
    };
    // YYYY-MM-DD is 10 characters, followed by '-' and the sequence number
    match (rest.get(..10), rest.get(10..11), rest.get(11..)) {
        (Some(date), Some("-"), Some(seq)) => {
            chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok()
                && !seq.is_empty()
                && seq.chars().all(|c| c.is_ascii_digit())
        }
        _ => false,
    }
}
