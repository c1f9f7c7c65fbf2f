use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::money::Money;

pub type AccountId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Checking,
    Savings,
}

impl AccountKind {
    /// Savings accounts can receive transfers and be withdrawn from, but never send.
    pub fn can_initiate_transfer(&self) -> bool {
        match self {
            AccountKind::Checking => true,
            AccountKind::Savings => false,
        }
    }
}

/// Record of funds moved by a transfer or a withdrawal.
///
/// For withdrawals `from_account_id == to_account_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    id: Uuid,
    from_account_id: AccountId,
    to_account_id: AccountId,
    amount: Money,
    date: NaiveDate,
}

impl Transaction {
    pub(crate) fn new(from_account_id: &str, to_account_id: &str, amount: Money) -> Self {
        Self {
            id: Uuid::new_v4(),
            from_account_id: from_account_id.to_owned(),
            to_account_id: to_account_id.to_owned(),
            amount,
            date: Utc::now().date_naive(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn from_account_id(&self) -> &str {
        &self.from_account_id
    }

    pub fn to_account_id(&self) -> &str {
        &self.to_account_id
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn is_withdrawal(&self) -> bool {
        self.from_account_id == self.to_account_id
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum AccountEventKind {
    Debited,
    Credited,
}

/// Validated balance change. `balance` is the amount the account holds once
/// the event is applied, so applying can never fail.
#[derive(Debug)]
pub struct AccountEvent {
    transaction: Transaction,
    balance: Decimal,
    kind: AccountEventKind,
}

impl AccountEvent {
    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: Money, available: Money },
    #[error("Account `{account_id}` is a savings account and cannot initiate transfers")]
    SourceAccountRestricted { account_id: AccountId },
    #[error("Balance of account `{account_id}` cannot hold {balance} plus {amount}")]
    BalanceOverflow {
        account_id: AccountId,
        balance: Money,
        amount: Decimal,
    },
}

#[derive(Debug, Clone)]
pub struct Account {
    id: AccountId,
    kind: AccountKind,
    balance: Money,
    transactions: Vec<Transaction>,
}

impl Account {
    pub fn new(id: impl Into<AccountId>, kind: AccountKind, balance: Money) -> Self {
        Self {
            id: id.into(),
            kind,
            balance,
            transactions: Vec::new(),
        }
    }

    pub fn checking(id: impl Into<AccountId>, balance: Money) -> Self {
        Self::new(id, AccountKind::Checking, balance)
    }

    pub fn savings(id: impl Into<AccountId>, balance: Money) -> Self {
        Self::new(id, AccountKind::Savings, balance)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> AccountKind {
        self.kind
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Balance currency is fixed at creation, events only rewrite the amount.
    pub fn apply(&mut self, event: &AccountEvent) {
        self.balance = self.balance.with_amount(event.balance);
        self.transactions.push(event.transaction.clone());
    }

    pub fn ensure_can_initiate_transfer(&self) -> Result<(), AccountError> {
        if self.kind.can_initiate_transfer() {
            Ok(())
        } else {
            Err(AccountError::SourceAccountRestricted {
                account_id: self.id.clone(),
            })
        }
    }

    /// `amount` is expressed in the balance currency.
    pub fn handle_debit(
        &self,
        amount: Decimal,
        transaction: Transaction,
    ) -> Result<AccountEvent, AccountError> {
        let insufficient = || AccountError::InsufficientFunds {
            requested: self.balance.with_amount(amount),
            available: self.balance,
        };
        if self.balance.amount() < amount {
            return Err(insufficient());
        }
        let balance = self
            .balance
            .amount()
            .checked_sub(amount)
            .ok_or_else(insufficient)?;
        Ok(AccountEvent {
            transaction,
            balance,
            kind: AccountEventKind::Debited,
        })
    }

    /// `amount` is expressed in the balance currency.
    pub fn handle_credit(
        &self,
        amount: Decimal,
        transaction: Transaction,
    ) -> Result<AccountEvent, AccountError> {
        let balance = self.balance.amount().checked_add(amount).ok_or_else(|| {
            AccountError::BalanceOverflow {
                account_id: self.id.clone(),
                balance: self.balance,
                amount,
            }
        })?;
        Ok(AccountEvent {
            transaction,
            balance,
            kind: AccountEventKind::Credited,
        })
    }
}
