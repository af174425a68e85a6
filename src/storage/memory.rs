use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::core::store::LedgerStore;
use crate::errors::{PlannerError, Result};
use crate::ledger::{
    AccountId, BalanceSnapshot, CategoryId, DedupKey, EntryId, Ledger, LedgerEntry,
    LedgerEntryTemplate, RuleId, SnapshotId,
};

/// A [`Ledger`] held in memory is itself a store; ids are handed out sequentially.
pub type MemoryStore = Ledger;

impl LedgerStore for Ledger {
    fn find_ledger_entry(
        &self,
        date: NaiveDate,
        description: &str,
        category_id: CategoryId,
    ) -> Result<Option<LedgerEntry>> {
        Ok(self
            .entries
            .iter()
            .find(|entry| {
                entry.date == date
                    && entry.category_id == category_id
                    && entry.description == description
            })
            .cloned())
    }

    fn entries_with_key(&self, key: &DedupKey) -> Result<Vec<LedgerEntry>> {
        Ok(self
            .entries
            .iter()
            .filter(|entry| entry.matches_key(key))
            .cloned()
            .collect())
    }

    fn find_planned_entry(
        &self,
        date: NaiveDate,
        category_id: CategoryId,
        origin_id: RuleId,
    ) -> Result<Option<LedgerEntry>> {
        Ok(self
            .entries
            .iter()
            .find(|entry| {
                entry.date == date
                    && entry.category_id == category_id
                    && entry.origin_id == Some(origin_id)
            })
            .cloned())
    }

    fn insert_ledger_entry(&mut self, template: LedgerEntryTemplate) -> Result<EntryId> {
        let id = self.next_entry_id();
        self.entries.push(template.into_entry(id));
        self.touch();
        Ok(id)
    }

    fn latest_balance_snapshot(&self, account_id: AccountId) -> Result<Option<Decimal>> {
        Ok(self
            .snapshots
            .iter()
            .filter(|snapshot| snapshot.account_id == account_id)
            .max_by_key(|snapshot| snapshot.sort_key())
            .map(|snapshot| snapshot.balance))
    }

    fn insert_balance_snapshot(
        &mut self,
        account_id: AccountId,
        entry_id: EntryId,
        amount: Decimal,
        date: NaiveDate,
    ) -> Result<SnapshotId> {
        let id = self.next_snapshot_id();
        self.snapshots.push(BalanceSnapshot {
            id,
            account_id,
            entry_id,
            balance: amount,
            date,
        });
        self.touch();
        Ok(id)
    }

    fn delete_balance_snapshot(&mut self, entry_id: EntryId) -> Result<bool> {
        let before = self.snapshots.len();
        self.snapshots.retain(|snapshot| snapshot.entry_id != entry_id);
        let removed = self.snapshots.len() != before;
        if removed {
            self.touch();
        }
        Ok(removed)
    }

    fn ledger_entry(&self, id: EntryId) -> Result<Option<LedgerEntry>> {
        Ok(self.entry(id).cloned())
    }

    fn update_ledger_entry(&mut self, entry: LedgerEntry) -> Result<()> {
        let slot = self
            .entry_mut(entry.id)
            .ok_or_else(|| PlannerError::Lookup(format!("ledger entry {} not found", entry.id)))?;
        *slot = entry;
        self.touch();
        Ok(())
    }

    fn delete_ledger_entry(&mut self, id: EntryId) -> Result<Option<LedgerEntry>> {
        let removed = self
            .entries
            .iter()
            .position(|entry| entry.id == id)
            .map(|index| self.entries.remove(index));
        if removed.is_some() {
            self.touch();
        }
        Ok(removed)
    }

    fn entries(&self) -> Result<Vec<LedgerEntry>> {
        Ok(self.entries.clone())
    }

    fn snapshots_for(&self, account_id: AccountId) -> Result<Vec<BalanceSnapshot>> {
        let mut snapshots: Vec<_> = self
            .snapshots
            .iter()
            .filter(|snapshot| snapshot.account_id == account_id)
            .cloned()
            .collect();
        snapshots.sort_by_key(BalanceSnapshot::sort_key);
        Ok(snapshots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn entries_get_sequential_ids_and_are_found_by_key() {
        let mut store = MemoryStore::new("Memory");
        let first = store
            .insert_ledger_entry(LedgerEntryTemplate::new(
                date(2024, 1, 5),
                "Rent",
                dec!(1000),
                98,
                4,
                12,
            ))
            .unwrap();
        let second = store
            .insert_ledger_entry(LedgerEntryTemplate::new(
                date(2024, 2, 5),
                "Rent",
                dec!(1000),
                98,
                4,
                12,
            ))
            .unwrap();
        assert_eq!((first, second), (1, 2));

        let found = store
            .find_ledger_entry(date(2024, 2, 5), "Rent", 12)
            .unwrap()
            .unwrap();
        assert_eq!(found.id, 2);
        assert!(store
            .find_ledger_entry(date(2024, 2, 5), "Rent", 13)
            .unwrap()
            .is_none());
    }

    #[test]
    fn key_and_origin_queries() {
        let mut store = MemoryStore::new("Memory");
        let rule_id = uuid::Uuid::new_v4();
        let mut debit =
            LedgerEntryTemplate::new(date(2024, 2, 3), "Move savings", dec!(50), 99, 16, 28);
        debit.origin_id = Some(rule_id);
        let credit = LedgerEntryTemplate {
            type_id: 17,
            ..debit.clone()
        };
        store.insert_ledger_entry(debit.clone()).unwrap();
        store.insert_ledger_entry(credit).unwrap();

        let halves = store.entries_with_key(&debit.dedup_key()).unwrap();
        let types: Vec<_> = halves.iter().map(|entry| entry.type_id).collect();
        assert_eq!(types, vec![16, 17]);

        let planned = store
            .find_planned_entry(date(2024, 2, 3), 28, rule_id)
            .unwrap()
            .unwrap();
        assert_eq!(planned.id, 1);
        assert!(store
            .find_planned_entry(date(2024, 2, 3), 28, uuid::Uuid::new_v4())
            .unwrap()
            .is_none());
    }

    #[test]
    fn latest_snapshot_orders_by_date_then_id() {
        let mut store = MemoryStore::new("Memory");
        store
            .insert_balance_snapshot(98, 1, dec!(300), date(2024, 3, 2))
            .unwrap();
        store
            .insert_balance_snapshot(98, 2, dec!(100), date(2024, 3, 1))
            .unwrap();
        store
            .insert_balance_snapshot(98, 3, dec!(350), date(2024, 3, 2))
            .unwrap();
        store
            .insert_balance_snapshot(99, 4, dec!(5), date(2024, 4, 1))
            .unwrap();

        assert_eq!(store.latest_balance_snapshot(98).unwrap(), Some(dec!(350)));
        let trail: Vec<_> = store
            .snapshots_for(98)
            .unwrap()
            .into_iter()
            .map(|snapshot| snapshot.entry_id)
            .collect();
        assert_eq!(trail, vec![2, 1, 3]);

        assert!(store.delete_balance_snapshot(3).unwrap());
        assert!(!store.delete_balance_snapshot(3).unwrap());
        assert_eq!(store.latest_balance_snapshot(98).unwrap(), Some(dec!(300)));
        assert_eq!(store.latest_balance_snapshot(7).unwrap(), None);
    }

    #[test]
    fn updating_a_missing_entry_is_a_lookup_error() {
        let mut store = MemoryStore::new("Memory");
        let entry =
            LedgerEntryTemplate::new(date(2024, 1, 5), "Rent", dec!(1), 98, 4, 12).into_entry(40);
        let err = store.update_ledger_entry(entry).unwrap_err();
        assert!(matches!(err, PlannerError::Lookup(_)));
        assert!(store.delete_ledger_entry(40).unwrap().is_none());
    }
}
