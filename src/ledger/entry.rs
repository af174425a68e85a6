use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AccountId, CategoryId, EntryId, PersonId, RuleId, TypeId};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntryStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Reconciled,
}

impl EntryStatus {
    /// Whether the entry counts as money that actually moved (dashboard actuals).
    pub fn is_settled(self) -> bool {
        matches!(self, EntryStatus::Confirmed | EntryStatus::Reconciled)
    }
}

/// Where a ledger entry came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryOrigin {
    Planned,
    BankStatement,
    #[default]
    Manual,
}

/// Uniqueness key for entries spawned from recurrence rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DedupKey {
    pub date: NaiveDate,
    pub description: String,
    pub category_id: CategoryId,
}

/// Entry content before storage assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntryTemplate {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub account_id: AccountId,
    pub type_id: TypeId,
    pub category_id: CategoryId,
    #[serde(default)]
    pub status: EntryStatus,
    #[serde(default)]
    pub origin: EntryOrigin,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_id: Option<RuleId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_id: Option<PersonId>,
}

impl LedgerEntryTemplate {
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        amount: Decimal,
        account_id: AccountId,
        type_id: TypeId,
        category_id: CategoryId,
    ) -> Self {
        Self {
            date,
            description: description.into(),
            amount,
            account_id,
            type_id,
            category_id,
            status: EntryStatus::Pending,
            origin: EntryOrigin::Manual,
            origin_id: None,
            person_id: None,
        }
    }

    pub fn with_status(mut self, status: EntryStatus) -> Self {
        self.status = status;
        self
    }

    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            date: self.date,
            description: self.description.clone(),
            category_id: self.category_id,
        }
    }

    pub fn into_entry(self, id: EntryId) -> LedgerEntry {
        LedgerEntry {
            id,
            date: self.date,
            description: self.description,
            amount: self.amount,
            account_id: self.account_id,
            type_id: self.type_id,
            category_id: self.category_id,
            status: self.status,
            origin: self.origin,
            origin_id: self.origin_id,
            person_id: self.person_id,
        }
    }
}

/// Materialized, persisted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: EntryId,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub account_id: AccountId,
    pub type_id: TypeId,
    pub category_id: CategoryId,
    pub status: EntryStatus,
    #[serde(default)]
    pub origin: EntryOrigin,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_id: Option<RuleId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_id: Option<PersonId>,
}

impl LedgerEntry {
    pub fn is_confirmed(&self) -> bool {
        self.status == EntryStatus::Confirmed
    }

    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            date: self.date,
            description: self.description.clone(),
            category_id: self.category_id,
        }
    }

    pub fn matches_key(&self, key: &DedupKey) -> bool {
        self.date == key.date
            && self.category_id == key.category_id
            && self.description == key.description
    }
}
