//! Shared setup for the end-to-end tests: an in-process ledger with the
//! crowdfund program registered, and helpers to fund identities.
//!
//! Run with: `cargo test -p crowdfund-e2e -- --nocapture`

use std::sync::Arc;

use crowdfund_client::{CrowdfundClient, Session};
use crowdfund_program::CrowdfundProgram;
use ledger::{Ledger, LedgerConfig, Message, PrivateKey, Transaction, WitnessSet};
use ledger_core::{AccountId, ProgramId};

pub use ledger_core::native_token::{LAMPORTS_PER_SOL, sol_to_lamports};

pub fn new_ledger() -> Arc<Ledger> {
    Arc::new(Ledger::new(LedgerConfig::default()).with_program(Arc::new(CrowdfundProgram::default())))
}

pub fn new_client() -> CrowdfundClient {
    CrowdfundClient::new(new_ledger())
}

/// A fresh identity holding `lamports`.
pub fn funded_session(ledger: &Ledger, lamports: u64) -> Session {
    let session = Session::generate();
    ledger
        .airdrop(session.account_id(), lamports)
        .expect("airdrop");
    session
}

/// Sign and submit one instruction with `key` as the only signer.
pub fn submit(
    ledger: &Ledger,
    program_id: ProgramId,
    account_ids: Vec<AccountId>,
    key: &PrivateKey,
    instruction: &crowdfund_core::Instruction,
) -> Result<ledger::TransactionReceipt, ledger::LedgerError> {
    let signer = ledger::account_id_from_key(key);
    let message = Message::try_new(program_id, account_ids, vec![ledger.nonce(&signer)], instruction)?;
    let witness_set = WitnessSet::for_message(&message, &[key])?;
    ledger.submit(&Transaction::new(message, witness_set))
}
