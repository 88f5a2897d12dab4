use crate::{
    common::{error::LedgerError, money::Money},
    domain::ledger::{AccountRepository, Ledger},
};

/// Opens (or creates) `client` and debits `amount`, returning the amount
/// withdrawn.
///
/// The account is created even when the withdrawal itself is rejected.
pub fn handle<R: AccountRepository>(
    ledger: &mut Ledger<R>,
    client: &str,
    amount: Money,
) -> Result<Money, LedgerError> {
    ledger.get_or_create(client)?.withdraw(amount)
}
