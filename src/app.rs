use std::{
    ffi::OsString,
    fs::File,
    io::{BufWriter, StdoutLock, Write, stdout},
    path::{Path, PathBuf},
};

use clap::{Args, Parser, Subcommand};
use log::info;
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    common::error::AppError,
    domain::ledger::Ledger,
    io::{
        generator::{self, GeneratorConfig},
        reader, writer,
    },
    store::SqliteStore,
    worker::processor::{IngestSummary, Processor},
};

#[derive(Parser, Debug)]
#[command(name = "transaction-ledger")]
#[command(about = "Simulates daily client transactions and posts them to an account ledger")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write one simulated day of transactions as `Client,Amount` CSV
    Generate {
        #[arg(short, long, default_value = "daily_transactions.csv")]
        output: PathBuf,
        /// Seed for a reproducible day
        #[arg(long)]
        seed: Option<u64>,
        /// Upper bound of the number of draws
        #[arg(long, default_value_t = 101)]
        max_draws: usize,
    },
    /// Post a `Client,Amount` CSV to the ledger, in file order
    Ingest {
        #[arg(short, long, default_value = "daily_transactions.csv")]
        input: PathBuf,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Print every account balance as CSV
    Balances {
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Print the transaction log in local time as CSV
    History {
        #[command(flatten)]
        store: StoreArgs,
        /// Only show this client's transactions
        #[arg(long)]
        account: Option<String>,
    },
}

#[derive(Args, Debug)]
pub struct StoreArgs {
    /// Ledger database file, created if absent
    #[arg(long, env = "LEDGER_DB", default_value = "accounts.sqlite")]
    pub db: PathBuf,
}

pub fn run<I, S>(args: I) -> Result<(), AppError>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
{
    let cli = Cli::try_parse_from(args)?;

    match cli.command {
        Command::Generate {
            output,
            seed,
            max_draws,
        } => {
            let config = GeneratorConfig {
                max_draws,
                ..GeneratorConfig::default()
            };
            generate(&output, seed, &config).map(|_| ())
        }
        Command::Ingest { input, store } => ingest(&input, &store.db).map(|_| ()),
        Command::Balances { store } => {
            let store = open_store(&store.db)?;
            let accounts = store.accounts()?;
            store.close()?;
            write_stdout(|out| writer::write_balances(out, &accounts))
        }
        Command::History { store, account } => {
            let store = open_store(&store.db)?;
            let rows = store.local_transactions(account.as_deref())?;
            store.close()?;
            write_stdout(|out| writer::write_history(out, &rows))
        }
    }
}

/// Writes one simulated day to `output` and returns the number of records.
pub fn generate(
    output: &Path,
    seed: Option<u64>,
    config: &GeneratorConfig,
) -> Result<usize, AppError> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let records = generator::generate(&mut rng, config)?;

    let file = File::create(output)?;
    writer::write_records(BufWriter::new(file), &records)?;
    info!("wrote {} transactions to {}", records.len(), output.display());
    Ok(records.len())
}

/// Posts every record of the CSV at `input` to the ledger at `db`.
pub fn ingest(input: &Path, db: &Path) -> Result<IngestSummary, AppError> {
    let file = File::open(input)?;
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut ledger = Ledger::new(open_store(db)?);
    let mut processor = Processor::new();
    let summary = processor.ingest(&mut ledger, reader::read_records(&mut csv_reader))?;

    ledger.into_inner().close()?;
    Ok(summary)
}

fn open_store(db: &Path) -> Result<SqliteStore, AppError> {
    SqliteStore::open(db).map_err(AppError::Schema)
}

fn write_stdout<F>(write: F) -> Result<(), AppError>
where
    F: FnOnce(&mut BufWriter<StdoutLock<'static>>) -> Result<(), csv::Error>,
{
    let mut out = BufWriter::new(stdout().lock());
    write(&mut out)?;
    out.flush()?;
    Ok(())
}
