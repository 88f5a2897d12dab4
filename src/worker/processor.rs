use log::{error, info, warn};

use crate::{
    common::{
        error::{AppError, LedgerError},
        event::TransactionEvent,
        money::Money,
    },
    domain::ledger::{AccountRepository, Ledger},
    worker::handlers::{deposit, withdrawal},
};

/// Counts of how the records of one ingest run ended.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    pub applied: usize,
    /// Rejected by validation: non-positive amount or insufficient funds.
    pub rejected: usize,
    /// Rolled back because the store failed.
    pub failed: usize,
}

impl IngestSummary {
    pub fn total(&self) -> usize {
        self.applied + self.rejected + self.failed
    }
}

/// Drives account operations from transaction events, strictly in the order
/// they are handed in.
#[derive(Debug, Default)]
pub struct Processor {
    summary: IngestSummary,
}

impl Processor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(&self) -> IngestSummary {
        self.summary
    }

    /// Applies one event. Failures are counted and returned, but leave the
    /// processor ready for the next event.
    pub fn process<R: AccountRepository>(
        &mut self,
        ledger: &mut Ledger<R>,
        event: TransactionEvent,
    ) -> Result<Money, LedgerError> {
        let result = match &event {
            TransactionEvent::Deposit { client, amount } => {
                deposit::handle(ledger, client, *amount)
            }
            TransactionEvent::Withdrawal { client, amount } => {
                withdrawal::handle(ledger, client, *amount)
            }
        };

        match &result {
            Ok(_) => self.summary.applied += 1,
            Err(e) if e.is_validation() => {
                warn!("rejected {:?}: {}", event, e);
                self.summary.rejected += 1;
            }
            Err(e) => {
                error!("failed {:?}: {}", event, e);
                self.summary.failed += 1;
            }
        }
        result
    }

    /// Processes every event of `events` in order and returns the summary.
    ///
    /// A source error (a malformed row) stops the run; per-record ledger
    /// failures do not.
    pub fn ingest<R, I>(
        &mut self,
        ledger: &mut Ledger<R>,
        events: I,
    ) -> Result<IngestSummary, AppError>
    where
        R: AccountRepository,
        I: IntoIterator<Item = Result<TransactionEvent, String>>,
    {
        for event in events {
            let event = event.map_err(AppError::Parse)?;
            let _ = self.process(ledger, event);
        }

        let summary = self.summary;
        info!(
            "ingested {} records: {} applied, {} rejected, {} failed",
            summary.total(),
            summary.applied,
            summary.rejected,
            summary.failed
        );
        Ok(summary)
    }
}
