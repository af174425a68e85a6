use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashSet},
    fs,
    path::{Path, PathBuf},
};

use crate::{
    errors::{PlannerError, Result},
    ledger::{AccountId, CategoryId, CurrencyId, TypeId},
    utils::{
        paths::{app_data_dir, config_backup_dir_in, config_file_in, ensure_dir},
        persistence::{read_json, write_json_atomic},
    },
};

const BACKUP_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Category codes and type ids used by the profit-split payroll expansion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfitSplitConfig {
    /// Category code on a rule that triggers the split.
    pub trigger_category: CategoryId,
    pub company_reserve_category: CategoryId,
    pub personal_payout_category: CategoryId,
    pub emergency_reserve_category: CategoryId,
    /// Type carried by the emergency reserve entry instead of the rule's type.
    pub reserve_type: TypeId,
}

/// Category code and type ids used by the inter-account transfer expansion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransferConfig {
    pub trigger_category: CategoryId,
    pub debit_type: TypeId,
    pub credit_type: TypeId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlannerConfig {
    /// Default account per currency for generated entries.
    #[serde(default)]
    pub default_accounts: BTreeMap<CurrencyId, AccountId>,
    /// Currency whose default account is used when a rule's currency has none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_currency: Option<CurrencyId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profit_split: Option<ProfitSplitConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer: Option<TransferConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger_file: Option<PathBuf>,
}

impl PlannerConfig {
    pub fn default_account_for(&self, currency_id: CurrencyId) -> Option<AccountId> {
        self.default_accounts.get(&currency_id).copied()
    }

    /// Checks that special category codes do not collide.
    pub fn validate(&self) -> Result<()> {
        let mut triggers = HashSet::new();
        let codes = self
            .profit_split
            .as_ref()
            .map(|split| ("profit split", split.trigger_category))
            .into_iter()
            .chain(
                self.transfer
                    .as_ref()
                    .map(|transfer| ("transfer", transfer.trigger_category)),
            );
        for (label, code) in codes {
            if !triggers.insert(code) {
                return Err(PlannerError::Configuration(format!(
                    "{label} trigger category {code} is already registered"
                )));
            }
        }
        if let Some(currency) = self.fallback_currency {
            if self.default_account_for(currency).is_none() {
                return Err(PlannerError::Configuration(format!(
                    "fallback currency {currency} has no default account"
                )));
            }
        }
        Ok(())
    }
}

/// Backup file listed by [`ConfigManager::list_backups`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigBackup {
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Loads and persists [`PlannerConfig`] under the application data directory.
pub struct ConfigManager {
    path: PathBuf,
    backups_dir: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        let backups_dir = config_backup_dir_in(&base);
        Ok(Self {
            path: config_file_in(&base),
            backups_dir,
        })
    }

    /// Reads the stored config, falling back to defaults when none was saved yet.
    pub fn load(&self) -> Result<PlannerConfig> {
        if !self.path.exists() {
            return Ok(PlannerConfig::default());
        }
        let config: PlannerConfig = read_json(&self.path)
            .map_err(|err| PlannerError::Configuration(err.detail().to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &PlannerConfig) -> Result<()> {
        config.validate()?;
        write_json_atomic(config, &self.path)
    }

    /// Writes a timestamped copy of `config`, returning the backup file name.
    pub fn backup(&self, config: &PlannerConfig, note: Option<&str>) -> Result<String> {
        ensure_dir(&self.backups_dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let mut name = format!("config_{}", timestamp);
        if let Some(label) = sanitize_note(note) {
            name.push('_');
            name.push_str(&label);
        }
        name.push_str(&format!(".{}", BACKUP_EXTENSION));
        write_json_atomic(config, &self.backups_dir.join(&name))?;
        Ok(name)
    }

    pub fn restore(&self, backup_name: &str) -> Result<PlannerConfig> {
        let path = self.backups_dir.join(backup_name);
        if !path.exists() {
            return Err(PlannerError::Configuration(format!(
                "configuration backup `{}` not found",
                backup_name
            )));
        }
        let config: PlannerConfig = read_json(&path)?;
        self.save(&config)?;
        Ok(config)
    }

    /// Lists backups, newest first.
    pub fn list_backups(&self) -> Result<Vec<ConfigBackup>> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(ConfigBackup {
                    name: name.to_string(),
                    created_at: parse_timestamp(name),
                });
            }
        }
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.name.cmp(&a.name)));
        Ok(entries)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn sanitize_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    let mut sanitized = String::new();
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.' | '_'))
            && !sanitized.is_empty()
            && !sanitized.ends_with('-')
        {
            sanitized.push('-');
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn parse_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let stem = name.strip_suffix(&format!(".{}", BACKUP_EXTENSION))?;
    let rest = stem.strip_prefix("config_")?;
    let raw = rest.get(..15)?;
    chrono::NaiveDateTime::parse_from_str(raw, BACKUP_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}
