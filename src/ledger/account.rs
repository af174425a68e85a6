use serde::{Deserialize, Serialize};

use super::{AccountId, CurrencyId};

/// Account row from the external lookup tables; entries and snapshots point at it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub currency_id: CurrencyId,
}

impl Account {
    pub fn new(id: AccountId, name: impl Into<String>, currency_id: CurrencyId) -> Self {
        Self {
            id,
            name: name.into(),
            currency_id,
        }
    }
}
