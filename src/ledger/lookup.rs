use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{
    account::Account, category::Category, transaction::TransactionType, AccountId, CategoryId,
    TypeId,
};

/// Read-only reference tables (accounts, categories, transaction types).
///
/// Loaded once and injected where needed instead of being re-fetched per call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupTables {
    #[serde(default)]
    pub accounts: BTreeMap<AccountId, Account>,
    #[serde(default)]
    pub categories: BTreeMap<CategoryId, Category>,
    #[serde(default)]
    pub types: BTreeMap<TypeId, TransactionType>,
}

impl LookupTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(mut self, account: Account) -> Self {
        self.accounts.insert(account.id, account);
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.categories.insert(category.id, category);
        self
    }

    pub fn with_type(mut self, kind: TransactionType) -> Self {
        self.types.insert(kind.id, kind);
        self
    }

    pub fn account(&self, id: AccountId) -> Option<&Account> {
        self.accounts.get(&id)
    }

    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.get(&id)
    }

    pub fn transaction_type(&self, id: TypeId) -> Option<&TransactionType> {
        self.types.get(&id)
    }

    /// Looks a category up by its display name, as forms submit names.
    pub fn category_by_name(&self, name: &str) -> Option<&Category> {
        self.categories
            .values()
            .find(|category| category.name.eq_ignore_ascii_case(name))
    }
}
