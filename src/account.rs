//! A single account balance.

use parking_lot::{Mutex, MutexGuard};

use crate::types::Balance;

/// One account's balance, behind its own mutex. `executor` is the only
/// caller that holds this guard across a mutation; everyone else reads
/// through [`Account::balance`].
pub struct Account {
    balance: Mutex<Balance>,
}

impl Account {
    pub fn new(initial_balance: Balance) -> Self {
        Self {
            balance: Mutex::new(initial_balance),
        }
    }

    /// Locks the balance for direct mutation. Used by `executor`, which
    /// acquires two of these in ascending account-id order.
    pub fn lock(&self) -> MutexGuard<'_, Balance> {
        self.balance.lock()
    }

    pub fn balance(&self) -> Balance {
        *self.balance.lock()
    }

    pub fn reset(&self, initial_balance: Balance) {
        *self.balance.lock() = initial_balance;
    }
}
