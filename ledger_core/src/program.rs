//! The interface between the ledger runtime and on-chain programs.

use borsh::BorshSerialize;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::account::{AccountPostState, AccountWithMetadata, ProgramId};
use crate::rent::Rent;

/// Execution environment handed to a program for one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramContext {
    pub program_id: ProgramId,
    pub rent: Rent,
    /// Latest committed slot when the transaction was loaded.
    pub slot: u64,
}

/// A rejected instruction. Builtin codes sit below 100; programs use their
/// own range (6000 and up by convention).
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("program error {code}: {message}")]
pub struct ProgramError {
    pub code: u32,
    pub message: String,
}

impl ProgramError {
    pub const INVALID_INSTRUCTION_DATA: u32 = 1;
    pub const NOT_ENOUGH_ACCOUNT_KEYS: u32 = 2;
    pub const SERIALIZATION: u32 = 3;

    pub fn custom(code: u32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_instruction_data(message: impl Into<String>) -> Self {
        Self::custom(Self::INVALID_INSTRUCTION_DATA, message)
    }

    pub fn not_enough_account_keys(expected: usize, got: usize) -> Self {
        Self::custom(
            Self::NOT_ENOUGH_ACCOUNT_KEYS,
            format!("expected {} accounts, got {}", expected, got),
        )
    }
}

/// Result of a successful instruction: one post-state per input account,
/// plus log lines and encoded events for the transaction receipt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramOutput {
    pub post_states: Vec<AccountPostState>,
    pub logs: Vec<String>,
    pub events: Vec<Vec<u8>>,
}

impl ProgramOutput {
    pub fn new(post_states: Vec<AccountPostState>) -> Self {
        Self {
            post_states,
            ..Self::default()
        }
    }

    pub fn log(&mut self, line: impl Into<String>) {
        self.logs.push(line.into());
    }

    pub fn emit<E: BorshSerialize>(&mut self, event: &E) -> Result<(), ProgramError> {
        let bytes = borsh::to_vec(event)
            .map_err(|e| ProgramError::custom(ProgramError::SERIALIZATION, e.to_string()))?;
        self.events.push(bytes);
        Ok(())
    }
}

/// An on-chain program the ledger can execute.
pub trait Program: Send + Sync {
    fn id(&self) -> ProgramId;

    fn execute(
        &self,
        ctx: &ProgramContext,
        accounts: &[AccountWithMetadata],
        instruction_data: &[u8],
    ) -> Result<ProgramOutput, ProgramError>;
}
