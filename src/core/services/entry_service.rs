//! Entry write surface. Every write that can move an entry in or out of
//! CONFIRMED goes through here so the balance trail follows it.

use tracing::warn;

use crate::core::lookup::LookupProvider;
use crate::core::store::LedgerStore;
use crate::core::time::Clock;
use crate::errors::{PlannerError, Result};
use crate::ledger::{EntryId, EntryStatus, LedgerEntry, LedgerEntryTemplate};

use super::balance_service::{BalanceChange, BalanceService};

pub struct EntryService<'a> {
    lookups: &'a dyn LookupProvider,
    clock: &'a dyn Clock,
}

impl<'a> EntryService<'a> {
    pub fn new(lookups: &'a dyn LookupProvider, clock: &'a dyn Clock) -> Self {
        Self { lookups, clock }
    }

    /// Inserts a new entry and records its balance when it starts out confirmed.
    pub fn create<S: LedgerStore + ?Sized>(
        &self,
        store: &mut S,
        template: LedgerEntryTemplate,
    ) -> Result<(LedgerEntry, BalanceChange)> {
        if template.status == EntryStatus::Confirmed {
            self.lookups.resolve_type_nature(template.type_id)?;
        }
        let id = store.insert_ledger_entry(template)?;
        let entry = Self::fetch(store, id)?;
        match BalanceService::on_status_change(store, self.lookups, self.clock, None, &entry) {
            Ok(change) => Ok((entry, change)),
            Err(err) => {
                warn!(entry_id = id, error = %err, "balance not recorded, entry removed");
                store.delete_ledger_entry(id)?;
                Err(err)
            }
        }
    }

    /// Updates the entry identified by `id` via the provided mutator.
    pub fn update<S, F>(
        &self,
        store: &mut S,
        id: EntryId,
        mutator: F,
    ) -> Result<(LedgerEntry, BalanceChange)>
    where
        S: LedgerStore + ?Sized,
        F: FnOnce(&mut LedgerEntry),
    {
        let before = Self::fetch(store, id)?;
        let mut after = before.clone();
        mutator(&mut after);
        after.id = before.id;

        if !before.is_confirmed() && after.is_confirmed() {
            self.lookups.resolve_type_nature(after.type_id)?;
        }
        store.update_ledger_entry(after.clone())?;
        match BalanceService::on_status_change(
            store,
            self.lookups,
            self.clock,
            Some(&before),
            &after,
        ) {
            Ok(change) => Ok((after, change)),
            Err(err) => {
                warn!(entry_id = id, error = %err, "balance not recorded, entry restored");
                store.update_ledger_entry(before)?;
                Err(err)
            }
        }
    }

    pub fn set_status<S: LedgerStore + ?Sized>(
        &self,
        store: &mut S,
        id: EntryId,
        status: EntryStatus,
    ) -> Result<(LedgerEntry, BalanceChange)> {
        self.update(store, id, |entry| entry.status = status)
    }

    /// Deletes the entry's snapshot first, then the entry itself.
    pub fn delete<S: LedgerStore + ?Sized>(
        &self,
        store: &mut S,
        id: EntryId,
    ) -> Result<LedgerEntry> {
        Self::fetch(store, id)?;
        store.delete_balance_snapshot(id)?;
        store
            .delete_ledger_entry(id)?
            .ok_or_else(|| PlannerError::Lookup(format!("ledger entry {id} not found")))
    }

    fn fetch<S: LedgerStore + ?Sized>(store: &S, id: EntryId) -> Result<LedgerEntry> {
        store
            .ledger_entry(id)?
            .ok_or_else(|| PlannerError::Lookup(format!("ledger entry {id} not found")))
    }
}
