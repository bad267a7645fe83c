//! Crowdfund program - campaign lifecycle on the ledger.
//!
//! One handler per instruction. Every handler checks all of its
//! preconditions before building post-states, so a rejected instruction
//! leaves no trace.

pub mod close_campaign;
pub mod create_campaign;
pub mod donate;
pub mod withdraw;

pub use crowdfund_core::Instruction;

use borsh::BorshDeserialize;
use crowdfund_core::{
    Campaign, CROWDFUND_PROGRAM_ID, CrowdfundAccount, CrowdfundError, find_campaign_address,
};
use ledger_core::{
    AccountWithMetadata, Program, ProgramContext, ProgramError, ProgramId, ProgramOutput,
};
use log::debug;

/// Dispatch incoming instructions to their handlers.
pub fn process(
    ctx: &ProgramContext,
    accounts: &[AccountWithMetadata],
    input_data: &[u8],
) -> Result<ProgramOutput, ProgramError> {
    let instruction = Instruction::try_from_slice(input_data).map_err(|e| {
        ProgramError::invalid_instruction_data(format!("Failed to deserialize instruction: {}", e))
    })?;
    debug!("crowdfund: {:?}", instruction);

    match instruction {
        Instruction::CreateCampaign { name, description } => {
            create_campaign::handle(ctx, accounts, name, description)
        }
        Instruction::Donate { amount } => donate::handle(ctx, accounts, amount),
        Instruction::Withdraw { amount } => withdraw::handle(ctx, accounts, amount),
        Instruction::CloseCampaign => close_campaign::handle(ctx, accounts),
    }
}

/// The crowdfund program as the ledger sees it.
#[derive(Debug, Clone, Copy)]
pub struct CrowdfundProgram {
    id: ProgramId,
}

impl CrowdfundProgram {
    pub fn new(id: ProgramId) -> Self {
        Self { id }
    }
}

impl Default for CrowdfundProgram {
    fn default() -> Self {
        Self::new(CROWDFUND_PROGRAM_ID)
    }
}

impl Program for CrowdfundProgram {
    fn id(&self) -> ProgramId {
        self.id
    }

    fn execute(
        &self,
        ctx: &ProgramContext,
        accounts: &[AccountWithMetadata],
        instruction_data: &[u8],
    ) -> Result<ProgramOutput, ProgramError> {
        process(ctx, accounts, instruction_data)
    }
}

/// Load the campaign stored at `account`, requiring it to be active.
///
/// The account must be owned by this program, carry a campaign record and
/// sit at the address derived from the record's owner and name; anything
/// else is `InvalidAccountData`.
pub(crate) fn load_active_campaign(
    ctx: &ProgramContext,
    account: &AccountWithMetadata,
) -> Result<Campaign, CrowdfundError> {
    if account.account.is_unoccupied() {
        return Err(CrowdfundError::AccountNotFound);
    }
    if !account.account.is_owned_by(&ctx.program_id) {
        return Err(CrowdfundError::InvalidAccountData);
    }
    let campaign = CrowdfundAccount::decode(&account.account.data)?.into_active()?;
    let (expected, _) = find_campaign_address(&ctx.program_id, &campaign.owner, &campaign.name)
        .map_err(|_| CrowdfundError::InvalidAccountData)?;
    if expected != account.account_id {
        return Err(CrowdfundError::InvalidAccountData);
    }
    Ok(campaign)
}
