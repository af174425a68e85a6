//! Ledger domain models: recurrence rules, generated occurrences, entries,
//! balance snapshots and the reference tables they point at.

pub mod account;
pub mod balance;
pub mod calendar;
pub mod category;
pub mod entry;
#[allow(clippy::module_inception)]
pub mod ledger;
pub mod lookup;
pub mod money;
pub mod recurring;
pub mod rule;
pub mod transaction;

pub type CurrencyId = u32;
pub type CategoryId = u32;
pub type TypeId = u32;
pub type AccountId = u32;
pub type PersonId = u32;
pub type EntryId = u64;
pub type SnapshotId = u64;
pub type RuleId = uuid::Uuid;

pub use account::Account;
pub use balance::BalanceSnapshot;
pub use calendar::DateWindow;
pub use category::Category;
pub use entry::{DedupKey, EntryOrigin, EntryStatus, LedgerEntry, LedgerEntryTemplate};
pub use ledger::{Ledger, CURRENT_SCHEMA_VERSION};
pub use lookup::LookupTables;
pub use recurring::{generate, occurrence_dates, Occurrence};
pub use rule::{RecurrenceKind, RecurrenceRule, RuleBook, UNBOUNDED};
pub use transaction::{Nature, TransactionType};
