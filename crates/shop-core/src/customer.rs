//! # Customer
//!
//! The paying side of a checkout: a name and a cash balance.

use crate::money::Money;
use serde::{Deserialize, Serialize};

/// A customer with a cash balance.
///
/// The balance never goes negative through this crate: checkout refuses any
/// total the balance does not cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    balance: Money,
}

impl Customer {
    pub fn new(name: impl Into<String>, balance: Money) -> Self {
        Self {
            name: name.into(),
            balance,
        }
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    pub fn can_afford(&self, total: Money) -> bool {
        self.balance >= total
    }

    /// Caller must have checked `can_afford(amount)`.
    pub(crate) fn debit(&mut self, amount: Money) {
        debug_assert!(self.can_afford(amount));
        self.balance -= amount;
    }
}
