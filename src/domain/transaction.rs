use chrono::{DateTime, Utc};

use crate::common::money::Money;

/// An entry of the append-only `transactions` log.
///
/// The store treats `(time, account)` as unique; records are never updated
/// or deleted once committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub time: DateTime<Utc>,
    pub account: String,
    /// Signed amount: positive for deposits, negative for withdrawals.
    pub amount: Money,
}

impl TransactionRecord {
    pub fn new(time: DateTime<Utc>, account: impl Into<String>, amount: Money) -> Self {
        Self {
            time,
            account: account.into(),
            amount,
        }
    }
}

/// Result of a committed posting: the new log entry and the balance the
/// `accounts` table holds afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    pub record: TransactionRecord,
    pub balance: Money,
}

/// A row of the `localtransactions` view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalTransaction {
    /// Timestamp rendered in the local timezone by SQLite.
    pub localtime: String,
    pub account: String,
    pub amount: Money,
}
