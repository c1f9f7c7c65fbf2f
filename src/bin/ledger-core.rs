use std::fs::File;

use anyhow::{Context, Result};
use ledger_core::bin_utils::{OperationError, Service};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let accounts_path = args
        .next()
        .context("Expected the accounts file as the first argument")?;
    let operations_path = args
        .next()
        .context("Expected the operations file as the second argument")?;
    let accounts = File::open(&accounts_path)
        .with_context(|| format!("Failed to open `{accounts_path}`"))?;
    let operations = File::open(&operations_path)
        .with_context(|| format!("Failed to open `{operations_path}`"))?;

    let service = Service {
        accounts,
        operations,
        output: &mut std::io::stdout(),
        error_printer: Box::new(|line, err| match err {
            OperationError::TransactionErr(err) => {
                eprintln!("Rejected at line {line} ({:?}): {err}", err.kind())
            }
            err => eprintln!("Error at line {line}: {err}"),
        }),
    };
    service.run()
}
