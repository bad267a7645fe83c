//! The ledger runtime: validates signed transactions, runs programs against
//! account snapshots and commits their effects atomically.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use ledger_core::{
    Account, AccountId, AccountPostState, AccountWithMetadata, Program, ProgramContext, ProgramId,
    Rent, SYSTEM_PROGRAM_ID,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::locks::AccountLocks;
use crate::store::{AccountStore, VersionedAccount};
use crate::transaction::Transaction;

/// An event emitted by a program, as recorded in the ledger's journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub slot: u64,
    pub program_id: ProgramId,
    pub signature: String,
    #[serde(with = "ledger_core::account::hex_bytes")]
    pub data: Vec<u8>,
}

/// What a committed transaction did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub signature: String,
    pub slot: u64,
    pub fee: u64,
    /// Post-state of the instruction accounts, in message order.
    pub accounts: Vec<(AccountId, Account)>,
    pub logs: Vec<String>,
    pub events: Vec<EventRecord>,
}

impl TransactionReceipt {
    pub fn account(&self, id: &AccountId) -> Option<&Account> {
        self.accounts.iter().find(|(a, _)| a == id).map(|(_, acc)| acc)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LedgerState {
    slot: u64,
    store: AccountStore,
    events: Vec<EventRecord>,
    burned_fees: u64,
}

pub struct Ledger {
    config: LedgerConfig,
    programs: HashMap<ProgramId, Arc<dyn Program>>,
    state: RwLock<LedgerState>,
    locks: AccountLocks,
}

impl Ledger {
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            config,
            programs: HashMap::new(),
            state: RwLock::new(LedgerState::default()),
            locks: AccountLocks::new(),
        }
    }

    pub fn load(config: LedgerConfig, path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let json = std::fs::read_to_string(path)?;
        let state: LedgerState = serde_json::from_str(&json)?;
        let mut ledger = Self::new(config);
        ledger.state = RwLock::new(state);
        Ok(ledger)
    }

    /// Load from `path` if it exists, otherwise start an empty ledger.
    pub fn load_or_new(config: LedgerConfig, path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        if path.as_ref().exists() {
            Self::load(config, path)
        } else {
            Ok(Self::new(config))
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LedgerError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&*self.read_state())?;

        // Write beside the target and rename over it, so a crash never
        // leaves a half-written ledger behind.
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        let mut file = File::create(&tmp)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        std::fs::rename(&tmp, path)?;
        debug!("saved ledger at slot {} to {}", self.slot(), path.display());
        Ok(())
    }

    pub fn with_program(mut self, program: Arc<dyn Program>) -> Self {
        self.register_program(program);
        self
    }

    pub fn register_program(&mut self, program: Arc<dyn Program>) {
        info!("registered program {}", program.id());
        self.programs.insert(program.id(), program);
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn rent(&self) -> Rent {
        self.config.rent
    }

    pub fn slot(&self) -> u64 {
        self.read_state().slot
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn get_account(&self, id: &AccountId) -> Option<Account> {
        self.read_state().store.get(id).map(|v| v.account.clone())
    }

    pub fn get_versioned_account(&self, id: &AccountId) -> Option<VersionedAccount> {
        self.read_state().store.get(id).cloned()
    }

    pub fn balance(&self, id: &AccountId) -> u64 {
        self.read_state().store.snapshot(id).lamports
    }

    pub fn nonce(&self, id: &AccountId) -> u64 {
        self.read_state().store.snapshot(id).nonce
    }

    /// Every account owned by `program_id` that holds data.
    pub fn get_program_accounts(&self, program_id: &ProgramId) -> Vec<(AccountId, VersionedAccount)> {
        self.read_state().store.program_accounts(program_id)
    }

    pub fn events(&self, program_id: &ProgramId) -> Vec<EventRecord> {
        self.read_state()
            .events
            .iter()
            .filter(|e| e.program_id == *program_id)
            .cloned()
            .collect()
    }

    pub fn total_lamports(&self) -> u128 {
        self.read_state().store.total_lamports()
    }

    pub fn burned_fees(&self) -> u64 {
        self.read_state().burned_fees
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Credit lamports out of thin air. Local faucet for wallets and tests.
    ///
    /// Only system-owned accounts can receive an airdrop; program accounts
    /// change balance through their program alone.
    pub fn airdrop(&self, id: AccountId, lamports: u64) -> Result<u64, LedgerError> {
        let _guard = self.locks.acquire(&[id]);
        let mut state = self.write_state();
        let mut account = state.store.snapshot(&id);
        if account.owner != SYSTEM_PROGRAM_ID {
            return Err(LedgerError::AirdropToProgramAccount(id));
        }
        account.lamports = account
            .lamports
            .checked_add(lamports)
            .ok_or(LedgerError::BalanceOverflow(id))?;
        let balance = account.lamports;
        state.slot += 1;
        let slot = state.slot;
        state.store.commit(slot, [(id, account)]);
        info!("slot {}: airdropped {} lamports to {}", slot, lamports, id);
        Ok(balance)
    }

    /// Validate, execute and commit one transaction. Either every effect
    /// (program writes, fee, nonces, events) lands or none does.
    pub fn submit(&self, tx: &Transaction) -> Result<TransactionReceipt, LedgerError> {
        let signature = tx.signature();
        let result = self.process(tx, &signature);
        match &result {
            Ok(receipt) => info!(
                "slot {}: committed {} ({} event(s))",
                receipt.slot,
                signature,
                receipt.events.len()
            ),
            Err(e) => warn!("rejected {}: {}", signature, e),
        }
        result
    }

    fn process(&self, tx: &Transaction, signature: &str) -> Result<TransactionReceipt, LedgerError> {
        let message = &tx.message;

        let signers = tx.witness_set.verify(message)?;
        let fee_payer = *signers.first().ok_or(LedgerError::NoSigners)?;
        if message.nonces.len() != signers.len() {
            return Err(LedgerError::NonceCountMismatch {
                expected: signers.len(),
                got: message.nonces.len(),
            });
        }
        for (i, id) in message.account_ids.iter().enumerate() {
            if message.account_ids[..i].contains(id) {
                return Err(LedgerError::DuplicateAccount(*id));
            }
        }
        let program = self
            .programs
            .get(&message.program_id)
            .ok_or(LedgerError::UnknownProgram(message.program_id))?;

        let mut lock_set = message.account_ids.clone();
        for signer in &signers {
            if !lock_set.contains(signer) {
                lock_set.push(*signer);
            }
        }
        let _guard = self.locks.acquire(&lock_set);

        // The account locks keep this snapshot current until commit.
        let (mut working, loaded_slot) = {
            let state = self.read_state();
            let working: BTreeMap<AccountId, Account> = lock_set
                .iter()
                .map(|id| (*id, state.store.snapshot(id)))
                .collect();
            (working, state.slot)
        };

        for (signer, nonce) in signers.iter().zip(&message.nonces) {
            let expected = working.get(signer).map_or(0, |a| a.nonce);
            if *nonce != expected {
                return Err(LedgerError::NonceMismatch {
                    account: *signer,
                    expected,
                    got: *nonce,
                });
            }
        }

        let fee = self
            .config
            .lamports_per_signature
            .saturating_mul(signers.len() as u64);
        let payer = working.entry(fee_payer).or_default();
        if payer.owner != SYSTEM_PROGRAM_ID {
            return Err(LedgerError::FeePayerNotSystemOwned { payer: fee_payer });
        }
        if payer.lamports < fee {
            return Err(LedgerError::InsufficientFundsForFee {
                payer: fee_payer,
                balance: payer.lamports,
                fee,
            });
        }
        payer.lamports -= fee;

        let pre_states: Vec<AccountWithMetadata> = message
            .account_ids
            .iter()
            .map(|id| {
                AccountWithMetadata::new(
                    *id,
                    working.get(id).cloned().unwrap_or_default(),
                    signers.contains(id),
                )
            })
            .collect();
        let ctx = ProgramContext {
            program_id: message.program_id,
            rent: self.config.rent,
            slot: loaded_slot,
        };

        debug!(
            "executing {} on {} account(s), {} signer(s)",
            message.program_id,
            pre_states.len(),
            signers.len()
        );
        let output = program.execute(&ctx, &pre_states, &message.instruction_data)?;
        let post_accounts = validate_execution(&ctx, &pre_states, &output.post_states)?;

        for (id, account) in message.account_ids.iter().zip(post_accounts) {
            working.insert(*id, account);
        }
        for signer in &signers {
            if let Some(account) = working.get_mut(signer) {
                account.nonce += 1;
            }
        }

        let receipt_accounts: Vec<(AccountId, Account)> = message
            .account_ids
            .iter()
            .map(|id| (*id, working.get(id).cloned().unwrap_or_default()))
            .collect();

        let mut state = self.write_state();
        state.slot += 1;
        let slot = state.slot;
        let events: Vec<EventRecord> = output
            .events
            .into_iter()
            .map(|data| EventRecord {
                slot,
                program_id: message.program_id,
                signature: signature.to_string(),
                data,
            })
            .collect();
        state.store.commit(slot, working);
        state.burned_fees = state.burned_fees.saturating_add(fee);
        state.events.extend(events.iter().cloned());

        Ok(TransactionReceipt {
            signature: signature.to_string(),
            slot,
            fee,
            accounts: receipt_accounts,
            logs: output.logs,
            events,
        })
    }

    fn read_state(&self) -> RwLockReadGuard<'_, LedgerState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, LedgerState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Check a program's post-states against what it was allowed to do and
/// return the accounts to commit.
///
/// - one post-state per input account
/// - a claim is only valid on an unoccupied account and hands it to the program
/// - accounts the program does not own keep owner and data, and only lose
///   lamports when they signed
/// - nonces belong to the ledger
/// - program-owned accounts holding lamports stay rent-exempt
/// - lamports are neither created nor destroyed
pub fn validate_execution(
    ctx: &ProgramContext,
    pre_states: &[AccountWithMetadata],
    post_states: &[AccountPostState],
) -> Result<Vec<Account>, LedgerError> {
    if pre_states.len() != post_states.len() {
        return Err(LedgerError::PostStateCountMismatch {
            expected: pre_states.len(),
            got: post_states.len(),
        });
    }

    let mut before: u128 = 0;
    let mut after: u128 = 0;
    let mut accounts = Vec::with_capacity(post_states.len());

    for (pre, post) in pre_states.iter().zip(post_states) {
        let id = pre.account_id;
        let mut account = post.account().clone();
        before += u128::from(pre.account.lamports);
        after += u128::from(account.lamports);

        if account.nonce != pre.account.nonce {
            return Err(LedgerError::NonceModified(id));
        }

        if post.requires_claim() {
            if !pre.account.is_unoccupied() {
                return Err(LedgerError::ClaimOccupied(id));
            }
            account.owner = ctx.program_id;
        } else if pre.account.owner != ctx.program_id {
            if account.owner != pre.account.owner || account.data != pre.account.data {
                return Err(LedgerError::ForeignAccountModified(id));
            }
            if account.lamports < pre.account.lamports && !pre.is_authorized {
                return Err(LedgerError::UnauthorizedDebit(id));
            }
        } else if account.owner != ctx.program_id {
            return Err(LedgerError::ForeignAccountModified(id));
        }

        if account.owner == ctx.program_id
            && account.lamports > 0
            && !ctx.rent.is_exempt(account.lamports, account.data.len())
        {
            return Err(LedgerError::NotRentExempt(id));
        }

        accounts.push(account);
    }

    if before != after {
        return Err(LedgerError::LamportsNotBalanced { before, after });
    }
    Ok(accounts)
}
