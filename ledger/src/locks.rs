//! Account-level write locks.
//!
//! A transaction takes every account it touches at once, so two
//! transactions sharing an account run one after the other while
//! transactions on disjoint accounts run side by side.

use std::collections::BTreeSet;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use ledger_core::AccountId;

#[derive(Debug, Default)]
pub struct AccountLocks {
    held: Mutex<BTreeSet<AccountId>>,
    released: Condvar,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until none of `ids` is held, then hold all of them.
    pub fn acquire(&self, ids: &[AccountId]) -> AccountLockGuard<'_> {
        let mut held = self.held_set();
        while ids.iter().any(|id| held.contains(id)) {
            held = self
                .released
                .wait(held)
                .unwrap_or_else(PoisonError::into_inner);
        }
        held.extend(ids.iter().copied());
        AccountLockGuard {
            locks: self,
            ids: ids.to_vec(),
        }
    }

    pub fn is_locked(&self, id: &AccountId) -> bool {
        self.held_set().contains(id)
    }

    fn held_set(&self) -> MutexGuard<'_, BTreeSet<AccountId>> {
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[must_use]
pub struct AccountLockGuard<'a> {
    locks: &'a AccountLocks,
    ids: Vec<AccountId>,
}

impl Drop for AccountLockGuard<'_> {
    fn drop(&mut self) {
        let mut held = self.locks.held_set();
        for id in &self.ids {
            held.remove(id);
        }
        drop(held);
        self.locks.released.notify_all();
    }
}
