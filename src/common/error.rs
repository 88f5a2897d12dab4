use crate::common::money::Money;

/// Failures raised by account operations and the ledger store.
///
/// Validation failures leave the ledger untouched and never stop an ingest
/// run. Storage failures abort only the posting in flight, which is rolled
/// back before the error is returned.
#[derive(thiserror::Error, Debug)]
pub enum LedgerError {
    #[error("the amount must be greater than zero, got {0}")]
    InvalidAmount(Money),
    #[error("insufficient funds on account {account}: requested {requested}, balance {balance}")]
    InsufficientFunds {
        account: String,
        requested: Money,
        balance: Money,
    },
    #[error("unknown account: {0}")]
    UnknownAccount(String),
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("invalid stored timestamp {value:?}: {source}")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

impl LedgerError {
    /// True for rejected input, as opposed to a failure of the store itself.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            LedgerError::InvalidAmount(_) | LedgerError::InsufficientFunds { .. }
        )
    }
}

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Usage(#[from] clap::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("invalid generator settings: {0}")]
    Generator(String),
    #[error("failed to initialize ledger store: {0}")]
    Schema(#[source] LedgerError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
