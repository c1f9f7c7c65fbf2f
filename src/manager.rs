use std::{fmt, sync::Arc};

use parking_lot::MutexGuard;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    account::{Account, AccountError, AccountId, Transaction},
    converter::{CurrencyConverter, RateTable},
    limits::TransferLimitPolicy,
    money::{Currency, CurrencyError, Money},
    store::{AccountHandle, AccountStore},
};

/// Which party of an operation an account id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountRole {
    Source,
    Destination,
    /// The single account of a withdrawal or a query.
    Holder,
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AccountRole::Source => "Source",
            AccountRole::Destination => "Destination",
            AccountRole::Holder => "Holder",
        })
    }
}

/// Flat view over [`TransactionError`], one entry per failure condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidAmount,
    UnsupportedCurrency,
    LimitExceeded,
    AccountNotFound,
    SameAccountTransfer,
    SourceAccountRestricted,
    InsufficientFunds,
    /// Resulting balance or converted amount falls outside the representable range.
    BalanceOverflow,
}

#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("Amount must not be negative, got {value}")]
    InvalidAmount { value: Money },
    #[error("{value} exceeds the single transfer limit of {limit}")]
    LimitExceeded { value: Money, limit: Money },
    #[error("{role} account `{account_id}` does not exist")]
    AccountNotFound {
        account_id: AccountId,
        role: AccountRole,
    },
    #[error("Cannot transfer from account `{account_id}` to itself")]
    SameAccountTransfer { account_id: AccountId },
    #[error(transparent)]
    Currency(#[from] CurrencyError),
    #[error(transparent)]
    Account(#[from] AccountError),
}

impl TransactionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransactionError::InvalidAmount { .. } => ErrorKind::InvalidAmount,
            TransactionError::LimitExceeded { .. } => ErrorKind::LimitExceeded,
            TransactionError::AccountNotFound { .. } => ErrorKind::AccountNotFound,
            TransactionError::SameAccountTransfer { .. } => ErrorKind::SameAccountTransfer,
            TransactionError::Currency(CurrencyError::UnsupportedCurrency { .. }) => {
                ErrorKind::UnsupportedCurrency
            }
            TransactionError::Currency(CurrencyError::ConversionOverflow { .. }) => {
                ErrorKind::BalanceOverflow
            }
            TransactionError::Account(AccountError::InsufficientFunds { .. }) => {
                ErrorKind::InsufficientFunds
            }
            TransactionError::Account(AccountError::SourceAccountRestricted { .. }) => {
                ErrorKind::SourceAccountRestricted
            }
            TransactionError::Account(AccountError::BalanceOverflow { .. }) => {
                ErrorKind::BalanceOverflow
            }
        }
    }
}

/// Moves funds between accounts held by an [`AccountStore`].
///
/// Every operation runs while holding the locks of all accounts it touches,
/// and mutates nothing until all preconditions pass.
pub struct TransactionManager<S, C = RateTable> {
    store: S,
    converter: C,
    limits: TransferLimitPolicy,
}

impl<S> TransactionManager<S>
where
    S: AccountStore,
{
    /// Default rate table and transfer limits.
    pub fn with_store(store: S) -> Self {
        Self::new(store, RateTable::default(), TransferLimitPolicy::default())
    }
}

impl<S, C> TransactionManager<S, C>
where
    S: AccountStore,
    C: CurrencyConverter,
{
    pub fn new(store: S, converter: C, limits: TransferLimitPolicy) -> Self {
        Self {
            store,
            converter,
            limits,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Moves `value` from `from_id` to `to_id`.
    ///
    /// The source is debited `value` expressed in its own currency, the
    /// destination is credited `value` expressed in its own currency, and the
    /// returned transaction records the credited amount. The same transaction
    /// is appended to both histories.
    pub fn transfer(
        &self,
        from_id: &str,
        to_id: &str,
        value: Money,
    ) -> Result<Transaction, TransactionError> {
        debug!(from = from_id, to = to_id, %value, "Transfer requested");
        self.try_transfer(from_id, to_id, value).inspect_err(|err| {
            debug!(from = from_id, to = to_id, %value, %err, "Transfer rejected")
        })
    }

    fn try_transfer(
        &self,
        from_id: &str,
        to_id: &str,
        value: Money,
    ) -> Result<Transaction, TransactionError> {
        ensure_not_negative(value)?;
        let limit = self.limits.limit_for(value.currency())?;
        if value.amount() > limit {
            return Err(TransactionError::LimitExceeded {
                value,
                limit: value.with_amount(limit),
            });
        }

        let source = self.lookup(from_id, AccountRole::Source)?;
        let destination = self.lookup(to_id, AccountRole::Destination)?;
        if from_id == to_id || Arc::ptr_eq(&source, &destination) {
            return Err(TransactionError::SameAccountTransfer {
                account_id: from_id.to_owned(),
            });
        }

        let (mut source, mut destination) =
            lock_in_order((from_id, &source), (to_id, &destination));
        source.ensure_can_initiate_transfer()?;

        let credited = self.express_in(value, destination.balance().currency())?;
        let debited = self.debit_amount(value, &source)?;

        let transaction = Transaction::new(from_id, to_id, credited);
        let debit = source.handle_debit(debited.amount(), transaction.clone())?;
        let credit = destination.handle_credit(credited.amount(), transaction)?;
        source.apply(&debit);
        destination.apply(&credit);

        let transaction = credit.transaction();
        info!(
            transaction_id = %transaction.id(),
            from = from_id,
            to = to_id,
            debited = %debited,
            credited = %credited,
            "Transfer committed"
        );
        Ok(transaction.clone())
    }

    /// Removes `amount` from a single account, converted into the account
    /// currency when needed.
    pub fn withdraw(
        &self,
        account_id: &str,
        amount: Money,
    ) -> Result<Transaction, TransactionError> {
        debug!(account = account_id, %amount, "Withdrawal requested");
        self.try_withdraw(account_id, amount).inspect_err(|err| {
            debug!(account = account_id, %amount, %err, "Withdrawal rejected")
        })
    }

    fn try_withdraw(
        &self,
        account_id: &str,
        amount: Money,
    ) -> Result<Transaction, TransactionError> {
        let handle = self.lookup(account_id, AccountRole::Holder)?;
        ensure_not_negative(amount)?;

        let mut account = handle.lock();
        let debited = self.debit_amount(amount, &account)?;
        let transaction = Transaction::new(account_id, account_id, debited);
        let event = account.handle_debit(debited.amount(), transaction)?;
        account.apply(&event);

        let transaction = event.transaction();
        info!(
            transaction_id = %transaction.id(),
            account = account_id,
            debited = %debited,
            "Withdrawal committed"
        );
        Ok(transaction.clone())
    }

    /// Current balance snapshot.
    pub fn check_funds(&self, account_id: &str) -> Result<Money, TransactionError> {
        let handle = self.lookup(account_id, AccountRole::Holder)?;
        let balance = handle.lock().balance();
        Ok(balance)
    }

    /// Copy of the account history, oldest first.
    pub fn retrieve_transactions(
        &self,
        account_id: &str,
    ) -> Result<Vec<Transaction>, TransactionError> {
        let handle = self.lookup(account_id, AccountRole::Holder)?;
        let transactions = handle.lock().transactions().to_vec();
        Ok(transactions)
    }

    fn lookup(&self, account_id: &str, role: AccountRole) -> Result<AccountHandle, TransactionError> {
        self.store
            .get(account_id)
            .ok_or_else(|| TransactionError::AccountNotFound {
                account_id: account_id.to_owned(),
                role,
            })
    }

    /// `value` in the account currency. An amount too large to express can never be covered.
    fn debit_amount(&self, value: Money, account: &Account) -> Result<Money, TransactionError> {
        self.express_in(value, account.balance().currency())
            .map_err(|err| match err {
                CurrencyError::ConversionOverflow { .. } => AccountError::InsufficientFunds {
                    requested: value,
                    available: account.balance(),
                }
                .into(),
                err => err.into(),
            })
    }

    fn express_in(&self, value: Money, currency: Currency) -> Result<Money, CurrencyError> {
        if value.currency() == currency {
            Ok(value)
        } else {
            self.converter.convert(value, currency)
        }
    }
}

fn ensure_not_negative(value: Money) -> Result<(), TransactionError> {
    if value.is_negative() {
        Err(TransactionError::InvalidAmount { value })
    } else {
        Ok(())
    }
}

/// Locks both accounts, lowest id first, and returns the guards in argument order.
fn lock_in_order<'a>(
    first: (&str, &'a AccountHandle),
    second: (&str, &'a AccountHandle),
) -> (MutexGuard<'a, Account>, MutexGuard<'a, Account>) {
    if first.0 <= second.0 {
        let first_guard = first.1.lock();
        let second_guard = second.1.lock();
        (first_guard, second_guard)
    } else {
        let second_guard = second.1.lock();
        let first_guard = first.1.lock();
        (first_guard, second_guard)
    }
}
