//! Account identifiers and the account record held by the ledger.

use std::fmt;
use std::str::FromStr;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Program identifiers share the account id space.
pub type ProgramId = AccountId;

/// Owner of every plain wallet account.
pub const SYSTEM_PROGRAM_ID: ProgramId = AccountId::new([0u8; 32]);

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// 32-byte account address. Displayed and serialized as base58.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, BorshSerialize, BorshDeserialize)]
pub struct AccountId([u8; 32]);

impl AccountId {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn value(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_bytes(self) -> [u8; 32] {
        self.0
    }
}

impl AsRef<[u8]> for AccountId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for AccountId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseAccountIdError {
    #[error("invalid base58: {0}")]
    InvalidBase58(String),
    #[error("expected 32 bytes, decoded {0}")]
    WrongLength(usize),
}

impl FromStr for AccountId {
    type Err = ParseAccountIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| ParseAccountIdError::InvalidBase58(e.to_string()))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| ParseAccountIdError::WrongLength(b.len()))?;
        Ok(Self(bytes))
    }
}

impl Serialize for AccountId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as Deserialize>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

/// A single ledger account.
///
/// The default value (no lamports, system-owned, no data, nonce 0) is the
/// state of every address nobody has touched yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Account {
    pub lamports: u64,
    pub owner: ProgramId,
    #[serde(with = "hex_bytes")]
    pub data: Vec<u8>,
    /// Transaction counter for accounts that sign. Only the ledger bumps it.
    pub nonce: u64,
}

impl Account {
    pub fn new_system(lamports: u64) -> Self {
        Self {
            lamports,
            ..Self::default()
        }
    }

    /// True when nothing has ever been written to this address.
    pub fn is_unoccupied(&self) -> bool {
        *self == Self::default()
    }

    pub fn is_owned_by(&self, program_id: &ProgramId) -> bool {
        self.owner == *program_id
    }
}

/// Serde adapter storing byte buffers as hex strings.
pub mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = <String as Deserialize>::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Program-facing views
// ---------------------------------------------------------------------------

/// An account as handed to a program: its id, current state, and whether
/// the transaction carries a valid signature for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountWithMetadata {
    pub account_id: AccountId,
    pub account: Account,
    pub is_authorized: bool,
}

impl AccountWithMetadata {
    pub fn new(account_id: AccountId, account: Account, is_authorized: bool) -> Self {
        Self {
            account_id,
            account,
            is_authorized,
        }
    }
}

/// The state a program wants an account to have after execution.
///
/// `claim` asks the ledger to hand an unoccupied account over to the
/// executing program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountPostState {
    account: Account,
    claim: bool,
}

impl AccountPostState {
    pub fn new(account: Account) -> Self {
        Self {
            account,
            claim: false,
        }
    }

    pub fn new_claimed(account: Account) -> Self {
        Self {
            account,
            claim: true,
        }
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn into_account(self) -> Account {
        self.account
    }

    pub fn requires_claim(&self) -> bool {
        self.claim
    }
}
