//! Services of the recurrence engine and the collaborator seams they depend on.

pub mod lookup;
pub mod services;
pub mod store;
pub mod time;

pub use lookup::{LookupContext, LookupProvider};
pub use store::LedgerStore;
pub use time::{Clock, FixedClock, SystemClock};
