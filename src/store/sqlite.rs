use std::path::Path;

use chrono::{DateTime, Duration, Timelike, Utc};
use log::debug;
use rusqlite::{Connection, OptionalExtension, params};

use crate::{
    common::{error::LedgerError, money::Money},
    domain::{
        account::Account,
        ledger::AccountRepository,
        transaction::{LocalTransaction, Posting, TransactionRecord},
    },
};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    name TEXT PRIMARY KEY NOT NULL,
    balance INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS transactions (
    time TIMESTAMP NOT NULL,
    account TEXT NOT NULL,
    amount INTEGER NOT NULL,
    PRIMARY KEY (time, account)
);

CREATE VIEW IF NOT EXISTS localtransactions AS
    SELECT strftime('%Y-%m-%d %H:%M:%f', transactions.time, 'localtime') AS localtime,
           transactions.account,
           transactions.amount
    FROM transactions
    ORDER BY transactions.time;
"#;

/// Fixed-width UTC layout, so that text order in SQLite is time order.
const STAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f+00:00";
const STAMP_PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f%:z";

/// Ledger store backed by a single SQLite database file.
///
/// The connection is opened once and owned by the store; every posting runs
/// inside its own SQLite transaction, which rolls back when dropped
/// uncommitted.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    last_stamp: Option<DateTime<Utc>>,
}

impl SqliteStore {
    /// Opens (creating if absent) the database file at `path` and ensures the
    /// schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LedgerError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, LedgerError> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, LedgerError> {
        let mut store = Self {
            conn,
            last_stamp: None,
        };
        store.initialize()?;
        Ok(store)
    }

    /// Creates the tables and the `localtransactions` view if missing.
    /// Safe to call on every startup.
    pub fn initialize(&mut self) -> Result<(), LedgerError> {
        self.conn.execute_batch(SCHEMA)?;
        self.last_stamp = self.latest_stamp()?;
        debug!("ledger schema ready, last stamp {:?}", self.last_stamp);
        Ok(())
    }

    pub fn close(self) -> Result<(), LedgerError> {
        self.conn.close().map_err(|(_, e)| LedgerError::from(e))
    }

    pub fn accounts(&self) -> Result<Vec<Account>, LedgerError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, balance FROM accounts ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok(Account::new(row.get::<_, String>(0)?, Money::new(row.get(1)?)))
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// The log of one account, oldest first.
    pub fn transactions(&self, name: &str) -> Result<Vec<TransactionRecord>, LedgerError> {
        let mut stmt = self.conn.prepare(
            "SELECT time, account, amount FROM transactions WHERE account = ?1 ORDER BY time",
        )?;
        let rows = stmt
            .query_map([name], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(time, account, amount)| {
                Ok(TransactionRecord::new(
                    parse_stamp(&time)?,
                    account,
                    Money::new(amount),
                ))
            })
            .collect()
    }

    /// Rows of the `localtransactions` view, optionally for one account.
    pub fn local_transactions(
        &self,
        account: Option<&str>,
    ) -> Result<Vec<LocalTransaction>, LedgerError> {
        let mut stmt = self.conn.prepare(
            "SELECT localtime, account, amount FROM localtransactions
             WHERE ?1 IS NULL OR account = ?1",
        )?;
        let rows = stmt.query_map([account], |row| {
            Ok(LocalTransaction {
                localtime: row.get(0)?,
                account: row.get(1)?,
                amount: Money::new(row.get(2)?),
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    fn latest_stamp(&self) -> Result<Option<DateTime<Utc>>, LedgerError> {
        let latest: Option<String> =
            self.conn
                .query_row("SELECT MAX(time) FROM transactions", [], |row| row.get(0))?;
        latest.as_deref().map(parse_stamp).transpose()
    }

    fn next_stamp(&self) -> DateTime<Utc> {
        stamp_after(Utc::now(), self.last_stamp)
    }
}

impl AccountRepository for SqliteStore {
    fn find_account(&self, name: &str) -> Result<Option<Account>, LedgerError> {
        let account = self
            .conn
            .query_row(
                "SELECT name, balance FROM accounts WHERE name = ?1",
                [name],
                |row| Ok(Account::new(row.get::<_, String>(0)?, Money::new(row.get(1)?))),
            )
            .optional()?;
        Ok(account)
    }

    fn insert_account(&mut self, account: &Account) -> Result<(), LedgerError> {
        self.conn.execute(
            "INSERT INTO accounts (name, balance) VALUES (?1, ?2)",
            params![account.name, account.balance.as_i64()],
        )?;
        Ok(())
    }

    fn post(&mut self, name: &str, amount: Money) -> Result<Posting, LedgerError> {
        let time = self.next_stamp();
        let tx = self.conn.transaction()?;

        let updated = tx.execute(
            "UPDATE accounts SET balance = balance + ?1 WHERE name = ?2",
            params![amount.as_i64(), name],
        )?;
        if updated == 0 {
            return Err(LedgerError::UnknownAccount(name.to_string()));
        }
        tx.execute(
            "INSERT INTO transactions (time, account, amount) VALUES (?1, ?2, ?3)",
            params![format_stamp(&time), name, amount.as_i64()],
        )?;
        let balance: i64 = tx.query_row(
            "SELECT balance FROM accounts WHERE name = ?1",
            [name],
            |row| row.get(0),
        )?;
        tx.commit()?;

        self.last_stamp = Some(time);
        debug!("posted {} to {} at {}", amount, name, format_stamp(&time));
        Ok(Posting {
            record: TransactionRecord::new(time, name, amount),
            balance: Money::new(balance),
        })
    }
}

/// The next log timestamp: `now`, unless the clock has not moved past the
/// last issued stamp, in which case one microsecond after it.
fn stamp_after(now: DateTime<Utc>, last: Option<DateTime<Utc>>) -> DateTime<Utc> {
    // Stamps are persisted with microsecond precision.
    let now = now
        .with_nanosecond(now.timestamp_subsec_micros() * 1_000)
        .unwrap_or(now);
    match last {
        Some(last) if now <= last => last + Duration::microseconds(1),
        _ => now,
    }
}

fn format_stamp(time: &DateTime<Utc>) -> String {
    time.format(STAMP_FORMAT).to_string()
}

fn parse_stamp(value: &str) -> Result<DateTime<Utc>, LedgerError> {
    DateTime::parse_from_str(value, STAMP_PARSE_FORMAT)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|source| LedgerError::Timestamp {
            value: value.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(micros: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::microseconds(micros)
    }

    #[test]
    fn initialize_is_idempotent() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.insert_account(&Account::new("Adams", Money::new(10))).unwrap();
        store.initialize().unwrap();
        store.initialize().unwrap();

        let accounts = store.accounts().unwrap();
        assert_eq!(accounts, vec![Account::new("Adams", Money::new(10))]);
    }

    #[test]
    fn schema_survives_reopening_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accounts.sqlite");

        let mut store = SqliteStore::open(&path).unwrap();
        store.insert_account(&Account::new("Baker", Money::zero())).unwrap();
        let first = store.post("Baker", Money::new(900)).unwrap();
        store.close().unwrap();

        let mut store = SqliteStore::open(&path).unwrap();
        assert_eq!(
            store.find_account("Baker").unwrap(),
            Some(Account::new("Baker", Money::new(900)))
        );
        assert_eq!(store.last_stamp, Some(first.record.time));

        let second = store.post("Baker", Money::new(-100)).unwrap();
        assert!(second.record.time > first.record.time);
        assert_eq!(second.balance, Money::new(800));
    }

    #[test]
    fn post_returns_committed_record_and_balance() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.insert_account(&Account::new("Clark", Money::new(100))).unwrap();

        let posting = store.post("Clark", Money::new(-40)).unwrap();
        assert_eq!(posting.balance, Money::new(60));
        assert_eq!(posting.record.account, "Clark");
        assert_eq!(posting.record.amount, Money::new(-40));

        let log = store.transactions("Clark").unwrap();
        assert_eq!(log, vec![posting.record]);
    }

    #[test]
    fn post_to_unknown_account_writes_nothing() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let err = store.post("Davis", Money::new(100)).unwrap_err();
        assert!(matches!(err, LedgerError::UnknownAccount(name) if name == "Davis"));
        assert!(store.transactions("Davis").unwrap().is_empty());
    }

    #[test]
    fn post_rolls_back_balance_when_log_append_fails() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.insert_account(&Account::new("Evans", Money::new(500))).unwrap();
        store
            .connection()
            .execute_batch(
                "CREATE TEMP TRIGGER reject_log BEFORE INSERT ON transactions
                 BEGIN SELECT RAISE(ABORT, 'log append rejected'); END;",
            )
            .unwrap();

        let err = store.post("Evans", Money::new(250)).unwrap_err();
        assert!(matches!(err, LedgerError::Storage(_)));
        assert_eq!(
            store.find_account("Evans").unwrap().unwrap().balance,
            Money::new(500)
        );
        assert!(store.transactions("Evans").unwrap().is_empty());
        assert_eq!(store.last_stamp, None);
    }

    #[test]
    fn post_rolls_back_when_balance_overflows() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store
            .insert_account(&Account::new("Irwin", Money::new(i64::MAX - 10)))
            .unwrap();

        let err = store.post("Irwin", Money::new(100)).unwrap_err();
        assert!(matches!(err, LedgerError::Storage(_)));
        assert_eq!(
            store.find_account("Irwin").unwrap().unwrap().balance,
            Money::new(i64::MAX - 10)
        );
        assert!(store.transactions("Irwin").unwrap().is_empty());
    }

    #[test]
    fn local_view_is_ordered_and_filterable() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        for name in ["Frank", "Ghosh"] {
            store.insert_account(&Account::new(name, Money::zero())).unwrap();
        }
        store.post("Ghosh", Money::new(300)).unwrap();
        store.post("Frank", Money::new(100)).unwrap();
        store.post("Ghosh", Money::new(-200)).unwrap();

        let all = store.local_transactions(None).unwrap();
        let amounts: Vec<i64> = all.iter().map(|t| t.amount.as_i64()).collect();
        assert_eq!(amounts, vec![300, 100, -200]);
        assert!(all.iter().all(|t| t.localtime.len() == "2024-01-01 00:00:00.000".len()));

        let ghosh = store.local_transactions(Some("Ghosh")).unwrap();
        assert_eq!(ghosh.len(), 2);
        assert!(ghosh.iter().all(|t| t.account == "Ghosh"));
    }

    #[test]
    fn stamps_are_strictly_increasing() {
        assert_eq!(stamp_after(at(10), None), at(10));
        assert_eq!(stamp_after(at(10), Some(at(5))), at(10));
        assert_eq!(stamp_after(at(10), Some(at(10))), at(11));
        assert_eq!(stamp_after(at(10), Some(at(42))), at(43));
    }

    #[test]
    fn stamps_round_trip_through_text() {
        let time = at(123_456);
        let text = format_stamp(&time);
        assert_eq!(text, "2023-11-14 22:13:20.123456+00:00");
        assert_eq!(parse_stamp(&text).unwrap(), time);
        assert!(parse_stamp("yesterday").is_err());
    }
}
