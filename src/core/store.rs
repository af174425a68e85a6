use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::errors::Result;
use crate::ledger::{
    AccountId, BalanceSnapshot, CategoryId, DedupKey, EntryId, LedgerEntry, LedgerEntryTemplate,
    RuleId, SnapshotId,
};

/// Persistence collaborator consumed by the recurrence engine.
///
/// Writers are assumed to be serialized; every mutating call takes `&mut self`
/// and either completes or returns a persistence error.
pub trait LedgerStore {
    fn find_ledger_entry(
        &self,
        date: NaiveDate,
        description: &str,
        category_id: CategoryId,
    ) -> Result<Option<LedgerEntry>>;

    /// Every entry sharing the `(date, description, category)` triple.
    fn entries_with_key(&self, key: &DedupKey) -> Result<Vec<LedgerEntry>> {
        Ok(self
            .entries()?
            .into_iter()
            .filter(|entry| entry.matches_key(key))
            .collect())
    }

    /// Entry spawned by rule `origin_id` on `date` in `category_id`, whatever its description.
    fn find_planned_entry(
        &self,
        date: NaiveDate,
        category_id: CategoryId,
        origin_id: RuleId,
    ) -> Result<Option<LedgerEntry>> {
        Ok(self.entries()?.into_iter().find(|entry| {
            entry.date == date
                && entry.category_id == category_id
                && entry.origin_id == Some(origin_id)
        }))
    }

    fn insert_ledger_entry(&mut self, template: LedgerEntryTemplate) -> Result<EntryId>;

    /// Balance of the account's most recent snapshot, ordered by `(date, id)`.
    fn latest_balance_snapshot(&self, account_id: AccountId) -> Result<Option<Decimal>>;

    fn insert_balance_snapshot(
        &mut self,
        account_id: AccountId,
        entry_id: EntryId,
        amount: Decimal,
        date: NaiveDate,
    ) -> Result<SnapshotId>;

    /// Removes the snapshot linked to `entry_id`; returns whether one existed.
    fn delete_balance_snapshot(&mut self, entry_id: EntryId) -> Result<bool>;

    fn ledger_entry(&self, id: EntryId) -> Result<Option<LedgerEntry>>;

    fn update_ledger_entry(&mut self, entry: LedgerEntry) -> Result<()>;

    fn delete_ledger_entry(&mut self, id: EntryId) -> Result<Option<LedgerEntry>>;

    fn entries(&self) -> Result<Vec<LedgerEntry>>;

    /// Snapshots of one account in `(date, id)` order.
    fn snapshots_for(&self, account_id: AccountId) -> Result<Vec<BalanceSnapshot>>;
}
