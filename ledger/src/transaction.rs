//! Signed transactions.
//!
//! A `Message` names the program, the instruction accounts in order, one
//! nonce per signer (in witness order) and the encoded instruction. The
//! `WitnessSet` carries one signature per signer over the borsh-encoded
//! message; the first signer pays the fee.

use borsh::{BorshDeserialize, BorshSerialize};
use ledger_core::{AccountId, ProgramId};

use crate::error::LedgerError;
use crate::keys::{PrivateKey, PublicKey, Signature};

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Message {
    pub program_id: ProgramId,
    pub account_ids: Vec<AccountId>,
    pub nonces: Vec<u64>,
    pub instruction_data: Vec<u8>,
}

impl Message {
    pub fn try_new<I: BorshSerialize>(
        program_id: ProgramId,
        account_ids: Vec<AccountId>,
        nonces: Vec<u64>,
        instruction: &I,
    ) -> Result<Self, LedgerError> {
        let instruction_data =
            borsh::to_vec(instruction).map_err(|e| LedgerError::Serialization(e.to_string()))?;
        Ok(Self {
            program_id,
            account_ids,
            nonces,
            instruction_data,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, LedgerError> {
        borsh::to_vec(self).map_err(|e| LedgerError::Serialization(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WitnessSet {
    signatures_and_public_keys: Vec<(Signature, PublicKey)>,
}

impl WitnessSet {
    pub fn for_message(message: &Message, keys: &[&PrivateKey]) -> Result<Self, LedgerError> {
        let bytes = message.to_bytes()?;
        let signatures_and_public_keys = keys
            .iter()
            .map(|key| (key.sign(&bytes), PublicKey::new_from_private_key(key)))
            .collect();
        Ok(Self {
            signatures_and_public_keys,
        })
    }

    pub fn signatures_and_public_keys(&self) -> &[(Signature, PublicKey)] {
        &self.signatures_and_public_keys
    }

    /// Verify every signature and return the signer ids in witness order.
    pub fn verify(&self, message: &Message) -> Result<Vec<AccountId>, LedgerError> {
        let bytes = message.to_bytes()?;
        let mut signers: Vec<AccountId> = Vec::with_capacity(self.signatures_and_public_keys.len());
        for (signature, public_key) in &self.signatures_and_public_keys {
            if !public_key.verify(&bytes, signature) {
                return Err(LedgerError::InvalidSignature(AccountId::from(public_key)));
            }
            let id = AccountId::from(public_key);
            if signers.contains(&id) {
                return Err(LedgerError::DuplicateSigner(id));
            }
            signers.push(id);
        }
        Ok(signers)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub message: Message,
    pub witness_set: WitnessSet,
}

impl Transaction {
    pub fn new(message: Message, witness_set: WitnessSet) -> Self {
        Self {
            message,
            witness_set,
        }
    }

    /// Base58 of the fee payer's signature; empty for unsigned transactions.
    pub fn signature(&self) -> String {
        self.witness_set
            .signatures_and_public_keys
            .first()
            .map(|(sig, _)| bs58::encode(sig.to_bytes()).into_string())
            .unwrap_or_default()
    }
}
