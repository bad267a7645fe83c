// donate.rs - handler for the Donate instruction.
//
// Expected accounts:
// - accounts[0]: active campaign
// - accounts[1]: donor, must sign

use crowdfund_core::{CrowdfundError, CrowdfundEvent};
use ledger_core::{AccountPostState, AccountWithMetadata, ProgramContext, ProgramError, ProgramOutput};

use crate::load_active_campaign;

pub fn handle(
    ctx: &ProgramContext,
    accounts: &[AccountWithMetadata],
    amount: u64,
) -> Result<ProgramOutput, ProgramError> {
    let [campaign_account, donor_account] = accounts else {
        return Err(ProgramError::not_enough_account_keys(2, accounts.len()));
    };

    if !donor_account.is_authorized {
        return Err(CrowdfundError::Unauthorized.into());
    }
    if amount == 0 {
        return Err(CrowdfundError::InvalidInput.into());
    }
    let mut campaign = load_active_campaign(ctx, campaign_account)?;
    if donor_account.account.lamports < amount {
        return Err(CrowdfundError::InsufficientFunds.into());
    }

    campaign.record_donation(amount)?;

    let mut campaign_post = campaign_account.account.clone();
    campaign_post.lamports = campaign_post
        .lamports
        .checked_add(amount)
        .ok_or(CrowdfundError::AmountOverflow)?;
    campaign_post.data = campaign.encode()?;

    let mut donor_post = donor_account.account.clone();
    donor_post.lamports -= amount;

    let mut output = ProgramOutput::new(vec![
        AccountPostState::new(campaign_post),
        AccountPostState::new(donor_post),
    ]);
    output.log(format!(
        "Donation of {} lamports to '{}' from {}",
        amount, campaign.name, donor_account.account_id
    ));
    output.emit(&CrowdfundEvent::DonationReceived {
        campaign: campaign_account.account_id,
        donor: donor_account.account_id,
        amount,
        amount_donated: campaign.amount_donated,
    })?;
    Ok(output)
}
