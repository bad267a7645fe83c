//! Versioned account store.

use std::collections::BTreeMap;

use ledger_core::{Account, AccountId, ProgramId};
use serde::{Deserialize, Serialize};

/// An account together with how often and when it was last written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedAccount {
    pub account: Account,
    /// Number of commits that changed this account.
    pub version: u64,
    pub last_modified_slot: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStore {
    accounts: BTreeMap<AccountId, VersionedAccount>,
}

impl AccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &AccountId) -> Option<&VersionedAccount> {
        self.accounts.get(id)
    }

    /// Current state of `id`; unknown addresses read as the default account.
    pub fn snapshot(&self, id: &AccountId) -> Account {
        self.accounts
            .get(id)
            .map(|v| v.account.clone())
            .unwrap_or_default()
    }

    pub fn version(&self, id: &AccountId) -> u64 {
        self.accounts.get(id).map_or(0, |v| v.version)
    }

    /// Every account owned by `owner` that holds data, in address order.
    pub fn program_accounts(&self, owner: &ProgramId) -> Vec<(AccountId, VersionedAccount)> {
        self.accounts
            .iter()
            .filter(|(_, v)| v.account.owner == *owner && !v.account.data.is_empty())
            .map(|(id, v)| (*id, v.clone()))
            .collect()
    }

    pub fn total_lamports(&self) -> u128 {
        self.accounts
            .values()
            .map(|v| u128::from(v.account.lamports))
            .sum()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Write every changed account. Accounts that end up in the default
    /// state are purged; unchanged ones keep their version.
    pub fn commit(&mut self, slot: u64, changes: impl IntoIterator<Item = (AccountId, Account)>) {
        for (id, account) in changes {
            if account.is_unoccupied() {
                self.accounts.remove(&id);
                continue;
            }
            match self.accounts.get_mut(&id) {
                Some(existing) if existing.account == account => {}
                Some(existing) => {
                    existing.account = account;
                    existing.version += 1;
                    existing.last_modified_slot = slot;
                }
                None => {
                    self.accounts.insert(
                        id,
                        VersionedAccount {
                            account,
                            version: 1,
                            last_modified_slot: slot,
                        },
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u8) -> AccountId {
        AccountId::new([n; 32])
    }

    #[test]
    fn test_unknown_account_reads_as_default() {
        let store = AccountStore::new();
        assert!(store.snapshot(&id(1)).is_unoccupied());
        assert_eq!(store.version(&id(1)), 0);
    }

    #[test]
    fn test_commit_bumps_version_only_on_change() {
        let mut store = AccountStore::new();
        store.commit(1, [(id(1), Account::new_system(10))]);
        assert_eq!(store.version(&id(1)), 1);

        store.commit(2, [(id(1), Account::new_system(10))]);
        assert_eq!(store.version(&id(1)), 1);
        assert_eq!(store.get(&id(1)).unwrap().last_modified_slot, 1);

        store.commit(3, [(id(1), Account::new_system(7))]);
        assert_eq!(store.version(&id(1)), 2);
        assert_eq!(store.get(&id(1)).unwrap().last_modified_slot, 3);
    }

    #[test]
    fn test_emptied_account_is_purged() {
        let mut store = AccountStore::new();
        store.commit(1, [(id(1), Account::new_system(10))]);
        store.commit(2, [(id(1), Account::default())]);
        assert!(store.get(&id(1)).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_program_accounts_filters_by_owner() {
        let program = id(9);
        let mut store = AccountStore::new();
        let owned = Account {
            lamports: 5,
            owner: program,
            data: vec![1],
            nonce: 0,
        };
        store.commit(1, [(id(1), owned.clone()), (id(2), Account::new_system(3))]);
        let listed = store.program_accounts(&program);
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].0, id(1));
        assert_eq!(listed[0].1.account, owned);
        assert_eq!(listed[0].1.version, 1);
        assert_eq!(store.total_lamports(), 8);
    }
}
