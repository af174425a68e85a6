use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::TypeId;

/// Direction of money for a transaction type; decides the balance sign.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Nature {
    Inflow,
    Outflow,
}

impl Nature {
    /// Applies `amount` to `balance` in the direction of this nature.
    pub fn apply(self, balance: Decimal, amount: Decimal) -> Decimal {
        match self {
            Nature::Inflow => balance + amount,
            Nature::Outflow => balance - amount,
        }
    }
}

impl fmt::Display for Nature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Nature::Inflow => f.write_str("inflow"),
            Nature::Outflow => f.write_str("outflow"),
        }
    }
}

/// Transaction type row from the lookup tables (e.g. "Salary", "Rent").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionType {
    pub id: TypeId,
    pub name: String,
    pub nature: Nature,
}

impl TransactionType {
    pub fn new(id: TypeId, name: impl Into<String>, nature: Nature) -> Self {
        Self {
            id,
            name: name.into(),
            nature,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn nature_sets_balance_sign() {
        assert_eq!(Nature::Inflow.apply(dec!(200.00), dec!(50.00)), dec!(250.00));
        assert_eq!(Nature::Outflow.apply(dec!(200.00), dec!(50.00)), dec!(150.00));
    }
}
