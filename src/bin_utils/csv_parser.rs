use std::io::Read;

use crate::{
    account::{AccountId, AccountKind},
    command::OperationKind,
    money::Currency,
};
use csv::{DeserializeRecordsIntoIter, Trim};
use rust_decimal::Decimal;
use serde::{Deserialize, de::DeserializeOwned};

/// Row of the accounts file.
#[derive(Debug, Deserialize)]
pub struct AccountRecord {
    pub id: AccountId,
    pub kind: AccountKind,
    pub currency: Currency,
    pub balance: Decimal,
}

/// Row of the operations file.
#[derive(Debug, Deserialize)]
pub struct OperationRecord {
    #[serde(rename = "type")]
    pub kind: OperationKind,
    pub from: AccountId,
    pub to: Option<AccountId>,
    pub amount: Option<Decimal>,
    pub currency: Option<Currency>,
}

/// Parses records in CSV format, yielding each one with the line it starts on.
pub struct CsvParser<R, T> {
    iter: DeserializeRecordsIntoIter<R, T>,
}

impl<R, T> CsvParser<R, T>
where
    R: Read,
    T: DeserializeOwned,
{
    /// Reads the header row eagerly so every record reports its own line.
    pub fn new(source: R) -> csv::Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(source);
        reader.headers()?;

        Ok(Self {
            iter: reader.into_deserialize(),
        })
    }
}

impl<R, T> Iterator for CsvParser<R, T>
where
    R: Read,
    T: DeserializeOwned,
{
    type Item = (u64, csv::Result<T>);

    fn next(&mut self) -> Option<Self::Item> {
        let curr_line = self.iter.reader().position().line();
        self.iter.next().map(|row| (curr_line, row))
    }
}
