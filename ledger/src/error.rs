use ledger_core::{AccountId, ProgramError, ProgramId};
use thiserror::Error;

/// Why the ledger refused a transaction. Nothing is committed in any case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("invalid signature from {0}")]
    InvalidSignature(AccountId),
    #[error("invalid public key")]
    InvalidPublicKey,
    #[error("transaction has no signers")]
    NoSigners,
    #[error("{0} signed more than once")]
    DuplicateSigner(AccountId),
    #[error("{0} appears more than once in the account list")]
    DuplicateAccount(AccountId),
    #[error("expected {expected} nonces, got {got}")]
    NonceCountMismatch { expected: usize, got: usize },
    #[error("nonce mismatch for {account}: expected {expected}, got {got}")]
    NonceMismatch {
        account: AccountId,
        expected: u64,
        got: u64,
    },
    #[error("unknown program {0}")]
    UnknownProgram(ProgramId),
    #[error("fee payer {payer} is not a system account")]
    FeePayerNotSystemOwned { payer: AccountId },
    #[error("fee payer {payer} holds {balance} lamports, fee is {fee}")]
    InsufficientFundsForFee {
        payer: AccountId,
        balance: u64,
        fee: u64,
    },
    #[error(transparent)]
    Program(#[from] ProgramError),
    #[error("program returned {got} post-states for {expected} accounts")]
    PostStateCountMismatch { expected: usize, got: usize },
    #[error("cannot claim occupied account {0}")]
    ClaimOccupied(AccountId),
    #[error("program modified owner or data of foreign account {0}")]
    ForeignAccountModified(AccountId),
    #[error("program debited {0} without its signature")]
    UnauthorizedDebit(AccountId),
    #[error("program modified the nonce of {0}")]
    NonceModified(AccountId),
    #[error("account {0} would not be rent-exempt")]
    NotRentExempt(AccountId),
    #[error("lamports not balanced: {before} before, {after} after")]
    LamportsNotBalanced { before: u128, after: u128 },
    #[error("cannot airdrop to {0}: it is owned by a program")]
    AirdropToProgramAccount(AccountId),
    #[error("balance overflow on {0}")]
    BalanceOverflow(AccountId),
    #[error("serialization failed: {0}")]
    Serialization(String),
    #[error("ledger persistence failed: {0}")]
    Persistence(String),
}

impl From<std::io::Error> for LedgerError {
    fn from(e: std::io::Error) -> Self {
        Self::Persistence(e.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        Self::Persistence(e.to_string())
    }
}
