use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::{
    core::store::LedgerStore,
    errors::{PlannerError, Result},
    ledger::{
        AccountId, BalanceSnapshot, CategoryId, DedupKey, EntryId, Ledger, LedgerEntry,
        LedgerEntryTemplate, RuleId, SnapshotId, CURRENT_SCHEMA_VERSION,
    },
    utils::persistence::{read_json, write_json_atomic},
};

/// Ledger document kept on disk; every mutation is written through.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    ledger: Ledger,
}

impl JsonStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let ledger = load_ledger_from_path(&path)?;
        Ok(Self { path, ledger })
    }

    /// Writes `ledger` to `path` and keeps it as the working copy.
    pub fn create(path: impl Into<PathBuf>, ledger: Ledger) -> Result<Self> {
        let store = Self {
            path: path.into(),
            ledger,
        };
        store.save()?;
        Ok(store)
    }

    pub fn open_or_create(path: impl Into<PathBuf>, name: &str) -> Result<Self> {
        let path = path.into();
        if path.exists() {
            Self::open(path)
        } else {
            Self::create(path, Ledger::new(name))
        }
    }

    pub fn save(&self) -> Result<()> {
        save_ledger_to_path(&self.ledger, &self.path)
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Applies `mutator` to the ledger and persists the result.
    pub fn modify<T, F>(&mut self, mutator: F) -> Result<T>
    where
        F: FnOnce(&mut Ledger) -> Result<T>,
    {
        let value = mutator(&mut self.ledger)?;
        self.ledger.touch();
        self.save()?;
        Ok(value)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_ledger(self) -> Ledger {
        self.ledger
    }

    fn write_through<T>(&mut self, value: T) -> Result<T> {
        self.save()?;
        Ok(value)
    }
}

impl LedgerStore for JsonStore {
    fn find_ledger_entry(
        &self,
        date: NaiveDate,
        description: &str,
        category_id: CategoryId,
    ) -> Result<Option<LedgerEntry>> {
        self.ledger.find_ledger_entry(date, description, category_id)
    }

    fn entries_with_key(&self, key: &DedupKey) -> Result<Vec<LedgerEntry>> {
        self.ledger.entries_with_key(key)
    }

    fn find_planned_entry(
        &self,
        date: NaiveDate,
        category_id: CategoryId,
        origin_id: RuleId,
    ) -> Result<Option<LedgerEntry>> {
        self.ledger.find_planned_entry(date, category_id, origin_id)
    }

    fn insert_ledger_entry(&mut self, template: LedgerEntryTemplate) -> Result<EntryId> {
        let id = self.ledger.insert_ledger_entry(template)?;
        self.write_through(id)
    }

    fn latest_balance_snapshot(&self, account_id: AccountId) -> Result<Option<Decimal>> {
        self.ledger.latest_balance_snapshot(account_id)
    }

    fn insert_balance_snapshot(
        &mut self,
        account_id: AccountId,
        entry_id: EntryId,
        amount: Decimal,
        date: NaiveDate,
    ) -> Result<SnapshotId> {
        let id = self
            .ledger
            .insert_balance_snapshot(account_id, entry_id, amount, date)?;
        self.write_through(id)
    }

    fn delete_balance_snapshot(&mut self, entry_id: EntryId) -> Result<bool> {
        let removed = self.ledger.delete_balance_snapshot(entry_id)?;
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    fn ledger_entry(&self, id: EntryId) -> Result<Option<LedgerEntry>> {
        self.ledger.ledger_entry(id)
    }

    fn update_ledger_entry(&mut self, entry: LedgerEntry) -> Result<()> {
        self.ledger.update_ledger_entry(entry)?;
        self.write_through(())
    }

    fn delete_ledger_entry(&mut self, id: EntryId) -> Result<Option<LedgerEntry>> {
        let removed = self.ledger.delete_ledger_entry(id)?;
        if removed.is_some() {
            self.save()?;
        }
        Ok(removed)
    }

    fn entries(&self) -> Result<Vec<LedgerEntry>> {
        self.ledger.entries()
    }

    fn snapshots_for(&self, account_id: AccountId) -> Result<Vec<BalanceSnapshot>> {
        self.ledger.snapshots_for(account_id)
    }
}

pub fn save_ledger_to_path(ledger: &Ledger, path: &Path) -> Result<()> {
    write_json_atomic(ledger, path)?;
    debug!(path = %path.display(), entries = ledger.entries.len(), "ledger saved");
    Ok(())
}

/// Reads a ledger document, rejecting ones written by a newer schema.
pub fn load_ledger_from_path(path: &Path) -> Result<Ledger> {
    if !path.exists() {
        return Err(PlannerError::Persistence(format!(
            "ledger file `{}` not found",
            path.display()
        )));
    }
    let ledger: Ledger = read_json(path)?;
    if ledger.schema_version > CURRENT_SCHEMA_VERSION {
        return Err(PlannerError::Persistence(format!(
            "ledger `{}` uses schema version {} but only {} is supported",
            path.display(),
            ledger.schema_version,
            CURRENT_SCHEMA_VERSION
        )));
    }
    Ok(ledger)
}

/// Dangling references in a loaded ledger, one message per problem.
pub fn ledger_warnings(ledger: &Ledger) -> Vec<String> {
    let lookups = &ledger.lookups;
    let mut warnings = Vec::new();

    for entry in &ledger.entries {
        if !lookups.accounts.is_empty() && lookups.account(entry.account_id).is_none() {
            warnings.push(format!(
                "entry {} references unknown account {}",
                entry.id, entry.account_id
            ));
        }
        if lookups.category(entry.category_id).is_none() {
            warnings.push(format!(
                "entry {} references missing category {}",
                entry.id, entry.category_id
            ));
        }
        if lookups.transaction_type(entry.type_id).is_none() {
            warnings.push(format!(
                "entry {} references unknown type {}",
                entry.id, entry.type_id
            ));
        }
    }

    let entry_ids: HashSet<_> = ledger.entries.iter().map(|entry| entry.id).collect();
    for snapshot in &ledger.snapshots {
        if !entry_ids.contains(&snapshot.entry_id) {
            warnings.push(format!(
                "balance snapshot {} points at missing entry {}",
                snapshot.id, snapshot.entry_id
            ));
        }
    }

    for rule in ledger.rules.all() {
        if let Err(err) = rule.validate() {
            warnings.push(err.to_string());
        }
        if lookups.category(rule.category_id).is_none() {
            warnings.push(format!(
                "rule `{}` references missing category {}",
                rule.description, rule.category_id
            ));
        }
    }
    warnings
}
