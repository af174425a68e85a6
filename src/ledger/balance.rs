use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AccountId, EntryId, SnapshotId};

/// Cumulative account balance recorded when an entry became confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub id: SnapshotId,
    pub account_id: AccountId,
    pub entry_id: EntryId,
    pub balance: Decimal,
    pub date: NaiveDate,
}

impl BalanceSnapshot {
    /// Ordering used to pick the most recent snapshot of an account.
    pub fn sort_key(&self) -> (NaiveDate, SnapshotId) {
        (self.date, self.id)
    }
}
