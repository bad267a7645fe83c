// create_campaign.rs - handler for the CreateCampaign instruction.
//
// Expected accounts:
// - accounts[0]: campaign PDA for (owner, name), must be unoccupied
// - accounts[1]: owner, must sign; pays the rent-exempt minimum

use crowdfund_core::{
    Campaign, CrowdfundError, CrowdfundEvent, find_campaign_address, validate_campaign_fields,
};
use ledger_core::{
    Account, AccountPostState, AccountWithMetadata, ProgramContext, ProgramError, ProgramOutput,
};

pub fn handle(
    ctx: &ProgramContext,
    accounts: &[AccountWithMetadata],
    name: String,
    description: String,
) -> Result<ProgramOutput, ProgramError> {
    let [campaign_account, owner_account] = accounts else {
        return Err(ProgramError::not_enough_account_keys(2, accounts.len()));
    };

    if !owner_account.is_authorized {
        return Err(CrowdfundError::Unauthorized.into());
    }
    validate_campaign_fields(&name, &description)?;

    let owner = owner_account.account_id;
    let (expected, _) = find_campaign_address(&ctx.program_id, &owner, &name)?;
    if campaign_account.account_id != expected {
        return Err(CrowdfundError::InvalidInput.into());
    }
    if !campaign_account.account.is_unoccupied() {
        return Err(CrowdfundError::AccountAlreadyExists.into());
    }

    let campaign = Campaign::new(owner, name, description);
    let data = campaign.encode()?;
    let rent = ctx.rent.minimum_balance(data.len());
    if owner_account.account.lamports < rent {
        return Err(CrowdfundError::InsufficientFunds.into());
    }

    let mut owner_post = owner_account.account.clone();
    owner_post.lamports -= rent;
    let campaign_post = Account {
        lamports: rent,
        owner: ctx.program_id,
        data,
        nonce: 0,
    };

    let mut output = ProgramOutput::new(vec![
        AccountPostState::new_claimed(campaign_post),
        AccountPostState::new(owner_post),
    ]);
    output.log(format!(
        "Campaign '{}' created at {} by {}",
        campaign.name, expected, owner
    ));
    output.emit(&CrowdfundEvent::CampaignCreated {
        campaign: expected,
        owner,
        name: campaign.name,
    })?;
    Ok(output)
}
