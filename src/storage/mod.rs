//! Backends implementing [`crate::core::LedgerStore`].

pub mod json_backend;
pub mod memory;

pub use json_backend::{ledger_warnings, load_ledger_from_path, save_ledger_to_path, JsonStore};
pub use memory::MemoryStore;
