use serde::{Deserialize, Serialize};

use crate::common::money::Money;

/// One row of the daily transactions file: `Client,Amount`.
///
/// `Amount` is signed and expressed in minor units. Positive rows are
/// deposits, everything else is a withdrawal of the absolute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
    #[serde(rename = "Client")]
    pub client: String,
    #[serde(rename = "Amount")]
    pub amount: i64,
}

impl ClientRecord {
    pub fn new(client: impl Into<String>, amount: i64) -> Self {
        Self {
            client: client.into(),
            amount,
        }
    }
}

/// Represents a transaction event that is sent from the record source to the
/// worker for processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionEvent {
    Deposit { client: String, amount: Money },
    Withdrawal { client: String, amount: Money },
}

impl TransactionEvent {
    pub fn client(&self) -> &str {
        match self {
            TransactionEvent::Deposit { client, .. } | TransactionEvent::Withdrawal { client, .. } => {
                client
            }
        }
    }
}

impl From<ClientRecord> for TransactionEvent {
    fn from(record: ClientRecord) -> Self {
        let amount = Money::new(record.amount);
        if amount.is_positive() {
            TransactionEvent::Deposit {
                client: record.client,
                amount,
            }
        } else {
            TransactionEvent::Withdrawal {
                client: record.client,
                amount: amount.abs(),
            }
        }
    }
}
