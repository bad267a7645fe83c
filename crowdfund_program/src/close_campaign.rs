// close_campaign.rs - handler for the CloseCampaign instruction.
//
// Expected accounts:
// - accounts[0]: active campaign
// - accounts[1]: campaign owner, must sign
//
// Every lamport goes back to the owner and the record is overwritten with the
// closed discriminator. The tombstone keeps the address occupied, so a closed
// campaign can never be revived under the same name.

use crowdfund_core::{CLOSED_DISCRIMINATOR, CrowdfundError, CrowdfundEvent};
use ledger_core::{AccountPostState, AccountWithMetadata, ProgramContext, ProgramError, ProgramOutput};

use crate::load_active_campaign;

pub fn handle(
    ctx: &ProgramContext,
    accounts: &[AccountWithMetadata],
) -> Result<ProgramOutput, ProgramError> {
    let [campaign_account, owner_account] = accounts else {
        return Err(ProgramError::not_enough_account_keys(2, accounts.len()));
    };

    let campaign = load_active_campaign(ctx, campaign_account)?;
    if !owner_account.is_authorized || owner_account.account_id != campaign.owner {
        return Err(CrowdfundError::Unauthorized.into());
    }

    let lamports = campaign_account.account.lamports;
    let mut owner_post = owner_account.account.clone();
    owner_post.lamports = owner_post
        .lamports
        .checked_add(lamports)
        .ok_or(CrowdfundError::AmountOverflow)?;

    let mut campaign_post = campaign_account.account.clone();
    campaign_post.lamports = 0;
    campaign_post.data = CLOSED_DISCRIMINATOR.to_vec();

    let mut output = ProgramOutput::new(vec![
        AccountPostState::new(campaign_post),
        AccountPostState::new(owner_post),
    ]);
    output.log(format!(
        "Closed '{}', returned {} lamports to {}",
        campaign.name, lamports, campaign.owner
    ));
    output.emit(&CrowdfundEvent::CampaignClosed {
        campaign: campaign_account.account_id,
        owner: campaign.owner,
        lamports,
    })?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use crowdfund_core::{CROWDFUND_PROGRAM_ID, CrowdfundAccount};

    #[test]
    fn test_close_drains_and_tombstones() {
        let (campaign_account, _) = make_campaign(2_000);
        let total = campaign_account.account.lamports;
        let accounts = vec![campaign_account, make_wallet(OWNER, 10, true)];

        let output = handle(&ctx(), &accounts).unwrap();
        let tombstone = output.post_states[0].account();
        assert_eq!(tombstone.lamports, 0);
        assert_eq!(tombstone.owner, CROWDFUND_PROGRAM_ID);
        assert_eq!(
            CrowdfundAccount::decode(&tombstone.data),
            Ok(CrowdfundAccount::Closed)
        );
        assert_eq!(output.post_states[1].account().lamports, total + 10);
    }

    #[test]
    fn test_only_owner_can_close() {
        let (campaign_account, _) = make_campaign(0);
        let accounts = vec![campaign_account, make_wallet(DONOR, 0, true)];
        assert_eq!(handle(&ctx(), &accounts).unwrap_err(), CrowdfundError::Unauthorized.into());
    }

    #[test]
    fn test_close_twice_fails() {
        let accounts = vec![closed_campaign(), make_wallet(OWNER, 0, true)];
        assert_eq!(handle(&ctx(), &accounts).unwrap_err(), CrowdfundError::CampaignClosed.into());
    }
}
