//! Batch driver for [`crate::manager::TransactionManager`]: seeds an in-memory
//! store from CSV, replays an operations file and prints final balances.

use std::io::{Read, Write};

use crate::{
    account::Account,
    command::{LedgerCommand, LedgerCommandError},
    manager::{TransactionError, TransactionManager},
    money::Money,
    store::{AccountStore, in_memory_store::InMemoryAccountStore},
};
use anyhow::{Context, Result};
use csv_parser::{AccountRecord, CsvParser, OperationRecord};
use csv_printer::{AccountSummary, print_accounts};
use thiserror::Error;
use tracing::info;
pub mod csv_parser;
pub mod csv_printer;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("Malformed row: {0}")]
    ParseErr(#[from] csv::Error),
    #[error(transparent)]
    CommandErr(#[from] LedgerCommandError),
    #[error(transparent)]
    TransactionErr(#[from] TransactionError),
}

pub struct Service<'w, A, R, W: 'w> {
    pub accounts: A,
    pub operations: R,
    pub output: &'w mut W,
    pub error_printer: Box<dyn FnMut(u64, OperationError)>,
}

impl<'w, A, R, W> Service<'w, A, R, W>
where
    A: Read,
    R: Read,
    W: Write + 'w,
{
    pub fn run(mut self) -> Result<()> {
        let store = load_accounts(self.accounts)?;
        info!(accounts = store.len(), "Accounts loaded");
        let manager = TransactionManager::with_store(store);

        let parser = CsvParser::<_, OperationRecord>::new(self.operations)
            .context("Failed to read operations header")?;
        for (line, row) in parser {
            if let Err(err) = process_row(&manager, row) {
                (self.error_printer)(line, err);
            }
        }

        let store = manager.store();
        let summaries = store
            .account_ids()
            .into_iter()
            .filter_map(|id| store.get(&id))
            .map(|handle| {
                let acc = handle.lock();
                AccountSummary {
                    id: acc.id().to_owned(),
                    kind: acc.kind(),
                    currency: acc.balance().currency(),
                    balance: acc.balance().amount(),
                    transactions: acc.transactions().len(),
                }
            });
        print_accounts(self.output, summaries)
    }
}

fn load_accounts<A: Read>(source: A) -> Result<InMemoryAccountStore> {
    let store = InMemoryAccountStore::default();
    let parser =
        CsvParser::<_, AccountRecord>::new(source).context("Failed to read accounts header")?;
    for (line, row) in parser {
        let record = row.with_context(|| format!("Invalid account at line {line}"))?;
        store.insert(Account::new(
            record.id,
            record.kind,
            Money::new(record.balance, record.currency),
        ));
    }
    Ok(store)
}

fn process_row(
    manager: &TransactionManager<InMemoryAccountStore>,
    row: csv::Result<OperationRecord>,
) -> Result<(), OperationError> {
    let row = row?;
    let cmd = LedgerCommand::parse_command(row.kind, row.from, row.to, row.amount, row.currency)?;
    cmd.execute(manager)?;
    Ok(())
}
