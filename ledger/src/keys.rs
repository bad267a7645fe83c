//! Wallet keys. An account id for a key-held account is the raw ed25519
//! verifying key.

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use ledger_core::AccountId;
use rand::rngs::OsRng;

use crate::error::LedgerError;

pub type Signature = ed25519_dalek::Signature;

#[derive(Clone)]
pub struct PrivateKey(SigningKey);

impl PrivateKey {
    pub fn new_os_random() -> Self {
        Self(SigningKey::generate(&mut OsRng))
    }

    pub fn from_bytes(secret: &[u8; 32]) -> Self {
        Self(SigningKey::from_bytes(secret))
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        self.0.sign(message)
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PrivateKey({})", PublicKey::new_from_private_key(self))
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(VerifyingKey);

impl PublicKey {
    pub fn new_from_private_key(key: &PrivateKey) -> Self {
        Self(key.0.verifying_key())
    }

    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, LedgerError> {
        VerifyingKey::from_bytes(bytes)
            .map(Self)
            .map_err(|_| LedgerError::InvalidPublicKey)
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        self.0.verify(message, signature).is_ok()
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", AccountId::from(self))
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({})", self)
    }
}

impl From<&PublicKey> for AccountId {
    fn from(key: &PublicKey) -> Self {
        AccountId::new(key.to_bytes())
    }
}

/// Account id controlled by `key`.
pub fn account_id_from_key(key: &PrivateKey) -> AccountId {
    AccountId::from(&PublicKey::new_from_private_key(key))
}
