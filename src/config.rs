//! Configuration file handling.
//!
//! The configuration file is stored at `$EXPENSES_HOME/config.json` and contains settings for
//! the application including the names of the data files and backup settings.

use crate::backup::Backup;
use crate::error::{ErrorType, IntoResult};
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_NAME: &str = "expenses";
const CONFIG_VERSION: u8 = 1;
const BACKUP_COPIES: u32 = 5;
const BACKUPS: &str = ".backups";
const CONFIG_JSON: &str = "config.json";
const EXPENSES_CSV: &str = "expenses.csv";
const OWED_CSV: &str = "owed.csv";
const UNDO_JSON: &str = "undo.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$EXPENSES_HOME` and from there it loads `$EXPENSES_HOME/config.json`. It provides
/// paths to the data files, which are either configurable or are expected in a certain location
/// within the home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    backups: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the data directory, its backups subdirectory and an initial `config.json` file
    /// with default settings. Existing data files in the directory are left alone, so `create`
    /// can be pointed at a directory that already holds `expenses.csv` and `owed.csv`.
    ///
    /// # Errors
    /// - Returns an error if the directory already has a `config.json`.
    /// - Returns an error if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the expenses home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.is_file() {
            bail!(
                "The directory is already initialized, found '{}'",
                config_path.display()
            )
        }

        let backups = root.join(BACKUPS);
        utils::make_dir(&backups).await?;

        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;
        debug!("Created {}", config_path.display());

        Ok(Self {
            root,
            backups,
            config_path,
            config_file,
        })
    }

    /// This will
    /// - validate that the home directory exists and that the config file exists
    /// - load the config file
    /// - validate that the backups directory exists
    /// - return the loaded configuration object
    ///
    /// Errors are classified as `ErrorType::Config`.
    pub async fn load(home: impl Into<PathBuf>) -> Result<Self> {
        Self::read(home.into()).await.pub_result(ErrorType::Config)
    }

    async fn read(maybe_relative: PathBuf) -> Result<Self> {
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The expenses home directory is missing, run 'expenses init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!(
                "The config file is missing '{}', run 'expenses init' first",
                config_path.display()
            )
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let config = Self {
            backups: root.join(BACKUPS),
            root,
            config_path,
            config_file,
        };
        if !config.backups.is_dir() {
            bail!(
                "The backups directory is missing '{}'",
                config.backups.display()
            )
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    pub fn backup_copies(&self) -> u32 {
        self.config_file.backup_copies
    }

    /// The expenses CSV file.
    pub fn expense_path(&self) -> PathBuf {
        self.resolve(&self.config_file.expense_file)
    }

    /// The owed items CSV file.
    pub fn owed_path(&self) -> PathBuf {
        self.resolve(&self.config_file.owed_file)
    }

    /// The file holding the last undoable owed action.
    pub fn undo_path(&self) -> PathBuf {
        self.root.join(UNDO_JSON)
    }

    /// Creates a new `Backup` instance for managing backup files, or `None` if backups are
    /// turned off.
    pub fn backup(&self) -> Option<Backup> {
        if self.config_file.backups_enabled && self.backup_copies() > 0 {
            Some(Backup::new(&self.backups, self.backup_copies()))
        } else {
            None
        }
    }

    /// Checks if `p` is relative, and if so, resolves it against the home directory.
    fn resolve(&self, p: &Path) -> PathBuf {
        if p.is_absolute() {
            return p.to_path_buf();
        }
        self.root.join(p)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "expenses",
///   "config_version": 1,
///   "backup_copies": 5,
///   "backups_enabled": true,
///   "expense_file": "expenses.csv",
///   "owed_file": "owed.csv"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "expenses"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Number of backup copies to keep, per data file
    #[serde(default = "default_backup_copies")]
    backup_copies: u32,

    /// Whether to back up a data file before it is rewritten
    #[serde(default = "default_true")]
    backups_enabled: bool,

    /// Path to the expenses file, relative to the home directory or absolute
    #[serde(default = "default_expense_file")]
    expense_file: PathBuf,

    /// Path to the owed items file, relative to the home directory or absolute
    #[serde(default = "default_owed_file")]
    owed_file: PathBuf,
}

fn default_backup_copies() -> u32 {
    BACKUP_COPIES
}

fn default_true() -> bool {
    true
}

fn default_expense_file() -> PathBuf {
    PathBuf::from(EXPENSES_CSV)
}

fn default_owed_file() -> PathBuf {
    PathBuf::from(OWED_CSV)
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            backup_copies: BACKUP_COPIES,
            backups_enabled: true,
            expense_file: default_expense_file(),
            owed_file: default_owed_file(),
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            config.config_version <= CONFIG_VERSION,
            "Config version {} is unsupported. Is a newer version of expenses available?",
            config.config_version
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}
