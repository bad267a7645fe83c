use ledger::{PrivateKey, account_id_from_key};
use ledger_core::AccountId;

/// The identity a client call acts as. Passed explicitly to every write.
#[derive(Debug, Clone)]
pub struct Session {
    key: PrivateKey,
    account_id: AccountId,
}

impl Session {
    pub fn new(key: PrivateKey) -> Self {
        let account_id = account_id_from_key(&key);
        Self { key, account_id }
    }

    /// A session with a fresh random key.
    pub fn generate() -> Self {
        Self::new(PrivateKey::new_os_random())
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn key(&self) -> &PrivateKey {
        &self.key
    }
}
