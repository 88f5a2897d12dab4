use std::io::Write;

use crate::{
    common::event::ClientRecord,
    domain::{account::Account, transaction::LocalTransaction},
};

#[derive(serde::Serialize)]
/// Output row for account balances, header `name,balance`.
struct BalanceRow<'a> {
    name: &'a str,
    balance: String,
}

#[derive(serde::Serialize)]
/// Output row for the local-time history, header `localtime,account,amount`.
struct HistoryRow<'a> {
    localtime: &'a str,
    account: &'a str,
    amount: String,
}

/// Writes generated records as a `Client,Amount` CSV.
///
/// # Examples
///
/// ```
/// use transaction_ledger::common::event::ClientRecord;
/// use transaction_ledger::io::writer::write_records;
///
/// let mut out = Vec::new();
/// write_records(&mut out, &[ClientRecord::new("Smith", -250)]).unwrap();
/// assert_eq!(String::from_utf8(out).unwrap(), "Client,Amount\nSmith,-250\n");
/// ```
pub fn write_records<W: Write>(writer: W, records: &[ClientRecord]) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer);

    // An empty day still gets its header.
    if records.is_empty() {
        wtr.write_record(["Client", "Amount"])?;
    }
    for record in records {
        wtr.serialize(record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes account balances in the order given, formatted in major units.
pub fn write_balances<W: Write>(writer: W, accounts: &[Account]) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer);

    if accounts.is_empty() {
        wtr.write_record(["name", "balance"])?;
    }
    for acc in accounts {
        wtr.serialize(BalanceRow {
            name: &acc.name,
            balance: acc.balance.to_string_2dp(),
        })?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn write_history<W: Write>(writer: W, rows: &[LocalTransaction]) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer);

    if rows.is_empty() {
        wtr.write_record(["localtime", "account", "amount"])?;
    }
    for row in rows {
        wtr.serialize(HistoryRow {
            localtime: &row.localtime,
            account: &row.account,
            amount: row.amount.to_string_2dp(),
        })?;
    }

    wtr.flush()?;
    Ok(())
}
