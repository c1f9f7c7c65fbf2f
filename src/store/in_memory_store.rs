use std::{collections::HashMap, sync::Arc};

use parking_lot::{Mutex, RwLock};

use crate::account::{Account, AccountId};

use super::{AccountHandle, AccountStore};

#[derive(Default)]
pub struct InMemoryAccountStore {
    accounts: RwLock<HashMap<AccountId, AccountHandle>>,
}

impl InMemoryAccountStore {
    pub fn new(accounts: impl IntoIterator<Item = Account>) -> Self {
        let store = Self::default();
        for account in accounts {
            store.insert(account);
        }
        store
    }

    /// Replaces any account already stored under the same id.
    pub fn insert(&self, account: Account) -> AccountHandle {
        let handle = Arc::new(Mutex::new(account));
        let id = handle.lock().id().to_owned();
        self.accounts.write().insert(id, Arc::clone(&handle));
        handle
    }

    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids of all stored accounts, sorted.
    pub fn account_ids(&self) -> Vec<AccountId> {
        let mut ids: Vec<_> = self.accounts.read().keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl AccountStore for InMemoryAccountStore {
    fn get(&self, account_id: &str) -> Option<AccountHandle> {
        self.accounts.read().get(account_id).cloned()
    }

    fn exists(&self, account_id: &str) -> bool {
        self.accounts.read().contains_key(account_id)
    }
}
