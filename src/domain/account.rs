use crate::common::money::Money;

/// Persisted state of one client account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Unique client name, the primary key of the `accounts` table.
    pub name: String,
    /// Current balance in minor units.
    pub balance: Money,
}

impl Account {
    pub fn new(name: impl Into<String>, balance: Money) -> Self {
        Self {
            name: name.into(),
            balance,
        }
    }
}

/// How an account came to be handed out by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opened {
    Retrieved,
    Created,
}
