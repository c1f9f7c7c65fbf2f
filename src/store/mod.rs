use std::sync::Arc;

use parking_lot::Mutex;

use crate::account::Account;

pub mod in_memory_store;

/// Shared handle to a stored account. Lock it to read or mutate the account.
pub type AccountHandle = Arc<Mutex<Account>>;

/// Keyed lookup of accounts.
///
/// Lookups must be safe from many threads at once, independently of the
/// per-account locking done by the
/// [`TransactionManager`](crate::manager::TransactionManager).
pub trait AccountStore: Send + Sync {
    fn get(&self, account_id: &str) -> Option<AccountHandle>;

    fn exists(&self, account_id: &str) -> bool {
        self.get(account_id).is_some()
    }
}
