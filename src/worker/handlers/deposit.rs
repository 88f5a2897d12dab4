use crate::{
    common::{error::LedgerError, money::Money},
    domain::ledger::{AccountRepository, Ledger},
};

/// Opens (or creates) `client` and credits `amount`, returning the new balance.
pub fn handle<R: AccountRepository>(
    ledger: &mut Ledger<R>,
    client: &str,
    amount: Money,
) -> Result<Money, LedgerError> {
    ledger.get_or_create(client)?.deposit(amount)
}
