use std::process::ExitCode;

use env_logger::Env;
use log::error;

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    match transaction_ledger::app::run(std::env::args_os()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(transaction_ledger::common::error::AppError::Usage(e)) => {
            // Help and version requests also arrive here.
            let _ = e.print();
            if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
