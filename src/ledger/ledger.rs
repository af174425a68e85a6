use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    balance::BalanceSnapshot, entry::LedgerEntry, lookup::LookupTables, rule::RuleBook, EntryId,
    SnapshotId,
};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// Persisted household ledger document: planned rules, reference tables,
/// materialized entries and the balance trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    pub name: String,
    #[serde(default)]
    pub rules: RuleBook,
    #[serde(default)]
    pub lookups: LookupTables,
    #[serde(default)]
    pub entries: Vec<LedgerEntry>,
    #[serde(default)]
    pub snapshots: Vec<BalanceSnapshot>,
    #[serde(default)]
    pub last_entry_id: EntryId,
    #[serde(default)]
    pub last_snapshot_id: SnapshotId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Ledger::schema_version_default")]
    pub schema_version: u8,
}

impl Ledger {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            rules: RuleBook::new(),
            lookups: LookupTables::new(),
            entries: Vec::new(),
            snapshots: Vec::new(),
            last_entry_id: 0,
            last_snapshot_id: 0,
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn with_lookups(mut self, lookups: LookupTables) -> Self {
        self.lookups = lookups;
        self
    }

    pub fn entry(&self, id: EntryId) -> Option<&LedgerEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn entry_mut(&mut self, id: EntryId) -> Option<&mut LedgerEntry> {
        self.entries.iter_mut().find(|entry| entry.id == id)
    }

    pub fn next_entry_id(&mut self) -> EntryId {
        self.last_entry_id += 1;
        self.last_entry_id
    }

    pub fn next_snapshot_id(&mut self) -> SnapshotId {
        self.last_snapshot_id += 1;
        self.last_snapshot_id
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}
