//! Running per-account balance driven by confirmation transitions.

use rust_decimal::Decimal;
use tracing::debug;

use crate::core::lookup::LookupProvider;
use crate::core::store::LedgerStore;
use crate::core::time::Clock;
use crate::errors::Result;
use crate::ledger::{AccountId, LedgerEntry, SnapshotId};

/// What a status change did to the balance trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceChange {
    Appended {
        snapshot_id: SnapshotId,
        balance: Decimal,
    },
    Removed,
    Unchanged,
}

pub struct BalanceService;

impl BalanceService {
    /// Reacts to an entry write. `before` is `None` for a freshly created entry.
    ///
    /// Entering CONFIRMED appends `previous ± amount` dated today; leaving it
    /// deletes the entry's snapshot. Later snapshots are never recomputed.
    pub fn on_status_change<S: LedgerStore + ?Sized>(
        store: &mut S,
        lookups: &dyn LookupProvider,
        clock: &dyn Clock,
        before: Option<&LedgerEntry>,
        after: &LedgerEntry,
    ) -> Result<BalanceChange> {
        let was_confirmed = before.is_some_and(LedgerEntry::is_confirmed);
        match (was_confirmed, after.is_confirmed()) {
            (false, true) => {
                let nature = lookups.resolve_type_nature(after.type_id)?;
                let previous = Self::current_balance(store, after.account_id)?;
                let balance = nature.apply(previous, after.amount);
                let snapshot_id = store.insert_balance_snapshot(
                    after.account_id,
                    after.id,
                    balance,
                    clock.today(),
                )?;
                debug!(
                    entry_id = after.id,
                    account_id = after.account_id,
                    %previous,
                    %balance,
                    "balance snapshot appended"
                );
                Ok(BalanceChange::Appended {
                    snapshot_id,
                    balance,
                })
            }
            (true, false) => {
                if store.delete_balance_snapshot(after.id)? {
                    debug!(
                        entry_id = after.id,
                        account_id = after.account_id,
                        "balance snapshot removed"
                    );
                    Ok(BalanceChange::Removed)
                } else {
                    Ok(BalanceChange::Unchanged)
                }
            }
            _ => Ok(BalanceChange::Unchanged),
        }
    }

    /// Balance of the account's latest snapshot, zero when it has none.
    pub fn current_balance<S: LedgerStore + ?Sized>(
        store: &S,
        account_id: AccountId,
    ) -> Result<Decimal> {
        Ok(store
            .latest_balance_snapshot(account_id)?
            .unwrap_or(Decimal::ZERO))
    }
}
