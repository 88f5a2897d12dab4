use std::fs;
use std::io::Cursor;

use transaction_ledger::common::money::Money;
use transaction_ledger::domain::ledger::Ledger;
use transaction_ledger::store::SqliteStore;
use transaction_ledger::worker::processor::{IngestSummary, Processor};

fn ingest_case(input_csv: &str) -> (Ledger<SqliteStore>, IngestSummary) {
    let mut ledger = Ledger::new(SqliteStore::open_in_memory().expect("in-memory store"));
    let mut worker = Processor::new();

    let rdr = Cursor::new(input_csv.as_bytes());
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(rdr);

    let summary = worker
        .ingest(
            &mut ledger,
            transaction_ledger::io::reader::read_records(&mut csv_reader),
        )
        .expect("failed to ingest input");
    (ledger, summary)
}

fn balances_csv(ledger: &Ledger<SqliteStore>) -> String {
    let accounts = ledger.repository().accounts().expect("accounts");
    let mut out = Vec::<u8>::new();
    transaction_ledger::io::writer::write_balances(&mut out, &accounts)
        .expect("failed to write output CSV");
    String::from_utf8(out).expect("output was not valid UTF-8")
}

fn normalize_csv(s: &str) -> String {
    s.replace("\r\n", "\n")
        .lines()
        .map(|l| l.trim_end())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn assert_log_matches_balances(ledger: &Ledger<SqliteStore>) {
    for account in ledger.repository().accounts().unwrap() {
        let logged: Money = ledger
            .repository()
            .transactions(&account.name)
            .unwrap()
            .into_iter()
            .map(|t| t.amount)
            .sum();
        assert_eq!(logged, account.balance, "log out of sync for {}", account.name);
        assert!(!account.balance.is_negative());
    }
}

#[test]
fn case1_smith_and_rejected_first_withdrawal() {
    let input = fs::read_to_string("tests/fixtures/case1_input.csv").unwrap();
    let expected = fs::read_to_string("tests/fixtures/case1_expected.csv").unwrap();

    let (ledger, summary) = ingest_case(&input);

    assert_eq!(normalize_csv(&balances_csv(&ledger)), normalize_csv(&expected));
    assert_eq!(summary.applied, 3);
    assert_eq!(summary.rejected, 2);
    assert_log_matches_balances(&ledger);
}

#[test]
fn case2_order_sensitivity_and_zero_rows() {
    let input = fs::read_to_string("tests/fixtures/case2_input.csv").unwrap();
    let expected = fs::read_to_string("tests/fixtures/case2_expected.csv").unwrap();

    let (ledger, summary) = ingest_case(&input);

    assert_eq!(normalize_csv(&balances_csv(&ledger)), normalize_csv(&expected));
    assert_eq!(summary.total(), 8);
    assert_eq!(summary.rejected, 2);
    assert_log_matches_balances(&ledger);
}

#[test]
fn reopening_an_account_returns_unchanged_state() {
    let (mut ledger, _) = ingest_case("Client,Amount\nHills,800\n");

    let first = ledger.get_or_create("Hills").unwrap().balance();
    let second = ledger.get_or_create("Hills").unwrap().balance();
    assert_eq!(first, Money::new(800));
    assert_eq!(first, second);
}
