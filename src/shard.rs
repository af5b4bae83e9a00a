//! A partition of the account space.

use std::collections::HashMap;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::account::Account;
use crate::types::{AccountId, Balance, ShardIndex};

/// Guards a map of `account_id -> Account` with a readers-writer lock over
/// the map's structure. The map is populated once at construction and never
/// grows or shrinks afterward, so transfers only ever need the read side;
/// `reset` is the sole writer.
pub struct Shard {
    index: ShardIndex,
    accounts: RwLock<HashMap<AccountId, Account>>,
}

impl Shard {
    pub fn new(index: ShardIndex) -> Self {
        Self {
            index,
            accounts: RwLock::new(HashMap::new()),
        }
    }

    pub fn index(&self) -> ShardIndex {
        self.index
    }

    pub(crate) fn insert(&self, id: AccountId, account: Account) {
        self.accounts.write().insert(id, account);
    }

    pub fn read(&self) -> RwLockReadGuard<'_, HashMap<AccountId, Account>> {
        self.accounts.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, HashMap<AccountId, Account>> {
        self.accounts.write()
    }

    /// Non-blocking probe: `None` means the writer lock was not immediately
    /// available, which telemetry reports as "this shard is active".
    pub fn try_write(&self) -> Option<RwLockWriteGuard<'_, HashMap<AccountId, Account>>> {
        self.accounts.try_write()
    }

    /// Resets every account in the shard, in ascending account-id order,
    /// while holding the shard's writer lock.
    pub fn reset(&self, initial_balance: Balance) {
        let accounts = self.write();
        let mut ids: Vec<_> = accounts.keys().copied().collect();
        ids.sort_unstable();
        for id in ids {
            accounts[&id].reset(initial_balance);
        }
    }
}
