use crate::config::PlannerConfig;
use crate::errors::{PlannerError, Result};
use crate::ledger::{AccountId, CategoryId, CurrencyId, LookupTables, Nature, TypeId};

/// Read-only capability over the reference tables the engine needs.
pub trait LookupProvider {
    /// Nature of a transaction type; unknown types are a lookup error.
    fn resolve_type_nature(&self, type_id: TypeId) -> Result<Nature>;

    fn default_account_for_currency(&self, currency_id: CurrencyId) -> Option<AccountId>;

    fn has_category(&self, category_id: CategoryId) -> bool;

    /// Currency whose default account stands in when a currency has none.
    fn fallback_currency(&self) -> Option<CurrencyId> {
        None
    }
}

/// Lookup tables of a ledger paired with the planner configuration.
#[derive(Debug, Clone, Copy)]
pub struct LookupContext<'a> {
    pub tables: &'a LookupTables,
    pub config: &'a PlannerConfig,
}

impl<'a> LookupContext<'a> {
    pub fn new(tables: &'a LookupTables, config: &'a PlannerConfig) -> Self {
        Self { tables, config }
    }
}

impl LookupProvider for LookupContext<'_> {
    fn resolve_type_nature(&self, type_id: TypeId) -> Result<Nature> {
        self.tables
            .transaction_type(type_id)
            .map(|kind| kind.nature)
            .ok_or_else(|| PlannerError::Lookup(format!("unknown transaction type {type_id}")))
    }

    fn default_account_for_currency(&self, currency_id: CurrencyId) -> Option<AccountId> {
        self.config.default_account_for(currency_id)
    }

    fn has_category(&self, category_id: CategoryId) -> bool {
        self.tables.category(category_id).is_some()
    }

    fn fallback_currency(&self) -> Option<CurrencyId> {
        self.config.fallback_currency
    }
}
