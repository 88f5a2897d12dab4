use log::{error, info, warn};

use crate::{
    common::{error::LedgerError, money::Money},
    domain::{
        account::{Account, Opened},
        transaction::Posting,
    },
};

/// Persistence seam behind the ledger.
///
/// `post` must apply the balance change and append the log entry as a single
/// unit: either both are committed or neither is visible afterwards.
pub trait AccountRepository {
    fn find_account(&self, name: &str) -> Result<Option<Account>, LedgerError>;

    /// Inserts a new account and commits it before returning.
    fn insert_account(&mut self, account: &Account) -> Result<(), LedgerError>;

    fn post(&mut self, name: &str, amount: Money) -> Result<Posting, LedgerError>;
}

/// Account lookup and creation on top of an [`AccountRepository`].
#[derive(Debug)]
pub struct Ledger<R> {
    repo: R,
}

impl<R: AccountRepository> Ledger<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn into_inner(self) -> R {
        self.repo
    }

    pub fn get_or_create(&mut self, name: &str) -> Result<AccountHandle<'_, R>, LedgerError> {
        self.open_account(name, Money::zero())
    }

    /// Returns the persisted account for `name`, creating it with
    /// `opening_balance` on first contact.
    ///
    /// An existing account is returned unchanged; the opening balance only
    /// applies to a newly created one.
    pub fn open_account(
        &mut self,
        name: &str,
        opening_balance: Money,
    ) -> Result<AccountHandle<'_, R>, LedgerError> {
        let (account, opened) = match self.repo.find_account(name)? {
            Some(account) => {
                info!("Retrieved record for {}", account.name);
                (account, Opened::Retrieved)
            }
            None => {
                if opening_balance.is_negative() {
                    return Err(LedgerError::InvalidAmount(opening_balance));
                }
                let account = Account::new(name, opening_balance);
                self.repo.insert_account(&account)?;
                info!("Account created for {}", account.name);
                (account, Opened::Created)
            }
        };

        let handle = AccountHandle {
            repo: &mut self.repo,
            account,
            opened,
        };
        handle.show_balance();
        Ok(handle)
    }
}

/// A live view of one account, mutating it through the repository.
///
/// The cached balance is only ever replaced by a value read back from the
/// store, so it cannot drift from what is durably recorded.
#[derive(Debug)]
pub struct AccountHandle<'a, R> {
    repo: &'a mut R,
    account: Account,
    opened: Opened,
}

impl<R: AccountRepository> AccountHandle<'_, R> {
    pub fn name(&self) -> &str {
        &self.account.name
    }

    pub fn balance(&self) -> Money {
        self.account.balance
    }

    pub fn opened(&self) -> Opened {
        self.opened
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    /// Credits `amount` and returns the new balance.
    ///
    /// A non-positive amount is ignored and the unchanged balance returned.
    pub fn deposit(&mut self, amount: Money) -> Result<Money, LedgerError> {
        if !amount.is_positive() {
            warn!(
                "ignoring deposit of {} to {}: amount must be greater than zero",
                amount, self.account.name
            );
            return Ok(self.account.balance);
        }
        self.save_update(amount)?;
        info!("{} deposited to {}", amount, self.account.name);
        Ok(self.account.balance)
    }

    /// Debits `amount` and returns the amount withdrawn.
    ///
    /// Fails without touching the ledger unless `0 < amount <= balance`.
    pub fn withdraw(&mut self, amount: Money) -> Result<Money, LedgerError> {
        if !amount.is_positive() {
            return Err(LedgerError::InvalidAmount(amount));
        }
        if amount > self.account.balance {
            return Err(LedgerError::InsufficientFunds {
                account: self.account.name.clone(),
                requested: amount,
                balance: self.account.balance,
            });
        }
        self.save_update(-amount)?;
        info!("{} withdrawn from {}", amount, self.account.name);
        Ok(amount)
    }

    pub fn show_balance(&self) -> Money {
        info!(
            "Balance on account {} is {}",
            self.account.name, self.account.balance
        );
        self.account.balance
    }

    fn save_update(&mut self, amount: Money) -> Result<(), LedgerError> {
        match self.repo.post(&self.account.name, amount) {
            Ok(posting) => {
                self.account.balance = posting.balance;
                Ok(())
            }
            Err(e) => {
                error!(
                    "posting {} to {} rolled back: {}",
                    amount, self.account.name, e
                );
                self.resync();
                Err(e)
            }
        }
    }

    fn resync(&mut self) {
        match self.repo.find_account(&self.account.name) {
            Ok(Some(account)) => self.account = account,
            Ok(None) => error!("account {} vanished from the store", self.account.name),
            Err(e) => error!("failed to re-read account {}: {}", self.account.name, e),
        }
    }
}
