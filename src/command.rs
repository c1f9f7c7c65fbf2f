use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    account::{AccountId, Transaction},
    converter::CurrencyConverter,
    manager::{TransactionError, TransactionManager},
    money::{Currency, Money},
    store::AccountStore,
};

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Transfer,
    Withdrawal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerCommand {
    Transfer {
        from: AccountId,
        to: AccountId,
        value: Money,
    },
    Withdraw {
        account_id: AccountId,
        amount: Money,
    },
}

#[derive(Debug, Error)]
pub enum LedgerCommandError {
    #[error("Amount is required for {kind:?}")]
    AmountRequired { kind: OperationKind },
    #[error("Currency is required for {kind:?}")]
    CurrencyRequired { kind: OperationKind },
    #[error("Destination account is required for {kind:?}")]
    DestinationRequired { kind: OperationKind },
    #[error("{kind:?} must reference a single account, got `{from}` and `{to}`")]
    AccountMismatch {
        kind: OperationKind,
        from: AccountId,
        to: AccountId,
    },
}

impl LedgerCommand {
    /// Builds a command out of one batch row.
    ///
    /// Only the shape of the row is checked here, amounts and accounts are
    /// validated by the [`TransactionManager`].
    pub fn parse_command(
        kind: OperationKind,
        from: AccountId,
        to: Option<AccountId>,
        amount: Option<Decimal>,
        currency: Option<Currency>,
    ) -> Result<Self, LedgerCommandError> {
        let Some(amount) = amount else {
            return Err(LedgerCommandError::AmountRequired { kind });
        };
        let Some(currency) = currency else {
            return Err(LedgerCommandError::CurrencyRequired { kind });
        };
        let value = Money::new(amount, currency);
        match kind {
            OperationKind::Transfer => {
                let to = to.ok_or(LedgerCommandError::DestinationRequired { kind })?;
                Ok(Self::Transfer { from, to, value })
            }
            OperationKind::Withdrawal => match to {
                Some(to) if to != from => {
                    Err(LedgerCommandError::AccountMismatch { kind, from, to })
                }
                _ => Ok(Self::Withdraw {
                    account_id: from,
                    amount: value,
                }),
            },
        }
    }

    pub fn execute<S, C>(
        &self,
        manager: &TransactionManager<S, C>,
    ) -> Result<Transaction, TransactionError>
    where
        S: AccountStore,
        C: CurrencyConverter,
    {
        match self {
            Self::Transfer { from, to, value } => manager.transfer(from, to, *value),
            Self::Withdraw { account_id, amount } => manager.withdraw(account_id, *amount),
        }
    }
}
