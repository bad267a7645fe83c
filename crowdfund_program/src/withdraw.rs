// withdraw.rs - handler for the Withdraw instruction.
//
// Expected accounts:
// - accounts[0]: active campaign
// - accounts[1]: campaign owner, must sign
//
// The campaign keeps its rent-exempt minimum; only the surplus can leave.
// `amount_donated` is a running total of donations and is not reduced.

use crowdfund_core::{CrowdfundError, CrowdfundEvent};
use ledger_core::{AccountPostState, AccountWithMetadata, ProgramContext, ProgramError, ProgramOutput};

use crate::load_active_campaign;

pub fn handle(
    ctx: &ProgramContext,
    accounts: &[AccountWithMetadata],
    amount: u64,
) -> Result<ProgramOutput, ProgramError> {
    let [campaign_account, owner_account] = accounts else {
        return Err(ProgramError::not_enough_account_keys(2, accounts.len()));
    };

    let campaign = load_active_campaign(ctx, campaign_account)?;
    if !owner_account.is_authorized || owner_account.account_id != campaign.owner {
        return Err(CrowdfundError::Unauthorized.into());
    }
    if amount == 0 {
        return Err(CrowdfundError::InvalidInput.into());
    }

    let rent = ctx.rent.minimum_balance(campaign_account.account.data.len());
    let available = campaign_account.account.lamports.saturating_sub(rent);
    if amount > available {
        return Err(CrowdfundError::InsufficientFunds.into());
    }

    let mut campaign_post = campaign_account.account.clone();
    campaign_post.lamports -= amount;
    let mut owner_post = owner_account.account.clone();
    owner_post.lamports = owner_post
        .lamports
        .checked_add(amount)
        .ok_or(CrowdfundError::AmountOverflow)?;
    let remaining = campaign_post.lamports;

    let mut output = ProgramOutput::new(vec![
        AccountPostState::new(campaign_post),
        AccountPostState::new(owner_post),
    ]);
    output.log(format!(
        "Withdrew {} lamports from '{}', {} remain",
        amount, campaign.name, remaining
    ));
    output.emit(&CrowdfundEvent::Withdrawn {
        campaign: campaign_account.account_id,
        owner: campaign.owner,
        amount,
        remaining,
    })?;
    Ok(output)
}
