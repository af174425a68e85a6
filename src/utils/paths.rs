use dirs::home_dir;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::errors::Result;

const DEFAULT_DIR_NAME: &str = ".movement_planner";
const CONFIG_FILE: &str = "config.json";
const CONFIG_BACKUP_DIR: &str = "config_backups";
const LEDGER_DIR: &str = "ledgers";

/// Returns the application data directory, defaulting to `~/.movement_planner`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os("MOVEMENT_PLANNER_HOME") {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

pub fn config_file_in(base: &Path) -> PathBuf {
    base.join(CONFIG_FILE)
}

pub fn config_backup_dir_in(base: &Path) -> PathBuf {
    base.join(CONFIG_BACKUP_DIR)
}

/// Default location of a named ledger document.
pub fn ledger_file_in(base: &Path, name: &str) -> PathBuf {
    base.join(LEDGER_DIR).join(format!("{}.json", name))
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}
