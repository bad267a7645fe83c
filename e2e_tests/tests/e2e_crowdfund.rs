//! End-to-end tests for the crowdfund program, driven through the async
//! client against an in-process ledger.

use std::time::Duration;

use crowdfund_core::{Campaign, CrowdfundError, Instruction};
use crowdfund_client::{ClientError, CrowdfundClient, Session};
use crowdfund_e2e::{LAMPORTS_PER_SOL, funded_session, new_client, sol_to_lamports, submit};

fn rent_for(name: &str, description: &str) -> u64 {
    ledger_core::Rent::default().minimum_balance(Campaign::space(name.len(), description.len()))
}

fn sol(amount: &str) -> u64 {
    sol_to_lamports(amount).unwrap()
}

fn code(err: &ClientError) -> Option<CrowdfundError> {
    err.crowdfund_error()
}

async fn setup_campaign(client: &CrowdfundClient, name: &str) -> (Session, ledger_core::AccountId) {
    let owner = funded_session(client.ledger(), LAMPORTS_PER_SOL);
    let (address, _) = client
        .create_campaign(&owner, name, "")
        .await
        .expect("create campaign");
    (owner, address)
}

#[tokio::test]
async fn test_save_africa_scenario() {
    let client = new_client();
    let owner = funded_session(client.ledger(), LAMPORTS_PER_SOL);
    let donor_a = funded_session(client.ledger(), LAMPORTS_PER_SOL);
    let donor_b = funded_session(client.ledger(), LAMPORTS_PER_SOL);
    let stranger = funded_session(client.ledger(), LAMPORTS_PER_SOL);

    println!("📝 Creating 'Save Africa'...");
    let (address, _) = client
        .create_campaign(&owner, "Save Africa", "Wells and schools")
        .await
        .unwrap();
    let rent = rent_for("Save Africa", "Wells and schools");

    println!("🎁 Two donations of 0.2 SOL...");
    client.donate(&donor_a, address, sol("0.2")).await.unwrap();
    client.donate(&donor_b, address, sol("0.2")).await.unwrap();

    let snapshot = client.get_campaign(address).await.unwrap();
    assert_eq!(snapshot.campaign.amount_donated, sol("0.4"));
    assert_eq!(client.donations(address).await.unwrap().len(), 2);
    assert_eq!(snapshot.balance, rent + sol("0.4"));

    println!("🚫 Zero donation...");
    let err = client.donate(&donor_a, address, 0).await.unwrap_err();
    assert_eq!(code(&err), Some(CrowdfundError::InvalidInput));

    println!("🚫 Stranger withdraws 0.1 SOL...");
    let err = client
        .withdraw(&stranger, address, sol("0.1"))
        .await
        .unwrap_err();
    assert_eq!(code(&err), Some(CrowdfundError::Unauthorized));
    assert_eq!(client.get_campaign(address).await.unwrap(), snapshot);

    println!("💸 Owner withdraws 0.1 SOL...");
    let before = client.balance(owner.account_id()).await.unwrap();
    let receipt = client
        .withdraw(&owner, address, sol("0.1"))
        .await
        .unwrap();
    let after = client.balance(owner.account_id()).await.unwrap();
    assert_eq!(after, before + sol("0.1") - receipt.fee);

    let snapshot = client.get_campaign(address).await.unwrap();
    assert_eq!(snapshot.campaign.amount_donated, sol("0.4"));
    assert_eq!(snapshot.balance, rent + sol("0.3"));

    let donations = client.donations(address).await.unwrap();
    assert_eq!(donations.len(), 2);
    assert_eq!(donations[0].donor, donor_a.account_id());
    assert_eq!(donations[1].donor, donor_b.account_id());
    assert_eq!(donations[1].amount_donated, sol("0.4"));
    println!("✅ Save Africa scenario passed");
}

#[tokio::test]
async fn test_create_charges_rent_and_fee() {
    let client = new_client();
    let owner = funded_session(client.ledger(), LAMPORTS_PER_SOL);

    let (address, receipt) = client
        .create_campaign(&owner, "Books", "For the library")
        .await
        .unwrap();

    let rent = rent_for("Books", "For the library");
    assert_eq!(receipt.fee, 5000);
    assert_eq!(
        client.balance(owner.account_id()).await.unwrap(),
        LAMPORTS_PER_SOL - rent - 5000
    );
    assert_eq!(client.balance(address).await.unwrap(), rent);
    assert_eq!(
        client.campaign_address(&owner.account_id(), "Books").unwrap(),
        address
    );
}

#[tokio::test]
async fn test_rejected_donations_change_nothing() {
    let client = new_client();
    let (_owner, address) = setup_campaign(&client, "Shelter").await;
    let donor = funded_session(client.ledger(), sol("0.05"));

    let campaign_before = client.get_campaign(address).await.unwrap();
    let donor_before = client.ledger().get_versioned_account(&donor.account_id());
    let slot_before = client.ledger().slot();

    let err = client.donate(&donor, address, 0).await.unwrap_err();
    assert_eq!(code(&err), Some(CrowdfundError::InvalidInput));

    let err = client
        .donate(&donor, address, sol("0.05"))
        .await
        .unwrap_err();
    assert_eq!(code(&err), Some(CrowdfundError::InsufficientFunds));

    assert_eq!(client.get_campaign(address).await.unwrap(), campaign_before);
    assert_eq!(
        client.ledger().get_versioned_account(&donor.account_id()),
        donor_before
    );
    assert_eq!(client.ledger().slot(), slot_before);
    assert!(client.donations(address).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_donor_who_cannot_pay_fee() {
    let client = new_client();
    let (_owner, address) = setup_campaign(&client, "Fee").await;
    let broke = funded_session(client.ledger(), 100);

    let err = client.donate(&broke, address, 50).await.unwrap_err();
    assert_eq!(code(&err), Some(CrowdfundError::InsufficientFunds));
    assert_eq!(client.balance(broke.account_id()).await.unwrap(), 100);
}

#[tokio::test]
async fn test_donation_needs_donor_signature() {
    let client = new_client();
    let (_owner, address) = setup_campaign(&client, "Victim").await;
    let victim = funded_session(client.ledger(), LAMPORTS_PER_SOL);
    let attacker = funded_session(client.ledger(), LAMPORTS_PER_SOL);

    let err = submit(
        client.ledger(),
        client.program_id(),
        vec![address, victim.account_id()],
        attacker.key(),
        &Instruction::Donate { amount: 1_000 },
    )
    .unwrap_err();
    assert_eq!(
        ClientError::from(err).crowdfund_error(),
        Some(CrowdfundError::Unauthorized)
    );
    assert_eq!(client.balance(victim.account_id()).await.unwrap(), LAMPORTS_PER_SOL);
}

#[tokio::test]
async fn test_closed_campaign_rejects_everything() {
    let client = new_client();
    let (owner, address) = setup_campaign(&client, "Closing").await;
    let donor = funded_session(client.ledger(), LAMPORTS_PER_SOL);
    client.donate(&donor, address, 1_000_000).await.unwrap();

    let held = client.get_campaign(address).await.unwrap().balance;
    let owner_before = client.balance(owner.account_id()).await.unwrap();
    let receipt = client.close_campaign(&owner, address).await.unwrap();
    assert_eq!(
        client.balance(owner.account_id()).await.unwrap(),
        owner_before + held - receipt.fee
    );
    assert_eq!(client.balance(address).await.unwrap(), 0);

    let err = client.get_campaign(address).await.unwrap_err();
    assert_eq!(code(&err), Some(CrowdfundError::CampaignClosed));

    let err = client.donate(&donor, address, 1).await.unwrap_err();
    assert_eq!(code(&err), Some(CrowdfundError::CampaignClosed));

    let err = client.withdraw(&owner, address, 1).await.unwrap_err();
    assert_eq!(code(&err), Some(CrowdfundError::CampaignClosed));

    let err = client.close_campaign(&owner, address).await.unwrap_err();
    assert_eq!(code(&err), Some(CrowdfundError::CampaignClosed));

    let err = client.create_campaign(&owner, "Closing", "again").await.unwrap_err();
    assert_eq!(code(&err), Some(CrowdfundError::AccountAlreadyExists));

    assert!(client.get_all_campaigns().await.unwrap().is_empty());
    assert_eq!(client.donations(address).await.unwrap().len(), 1);

    // The tombstone stays program-owned and cannot be topped up.
    assert_eq!(
        client.ledger().airdrop(address, 1_000),
        Err(ledger::LedgerError::AirdropToProgramAccount(address))
    );
    assert_eq!(client.balance(address).await.unwrap(), 0);
}

#[tokio::test]
async fn test_listing_and_lamport_conservation() {
    let client = new_client().with_timeout(Duration::from_secs(10));
    let (_a, first) = setup_campaign(&client, "First").await;
    let (_b, second) = setup_campaign(&client, "Second").await;
    let donor = funded_session(client.ledger(), LAMPORTS_PER_SOL);
    client.donate(&donor, second, 42).await.unwrap();

    let mut listed: Vec<_> = client
        .get_all_campaigns()
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.address)
        .collect();
    listed.sort();
    let mut expected = vec![first, second];
    expected.sort();
    assert_eq!(listed, expected);

    let ledger = client.ledger();
    assert_eq!(
        ledger.total_lamports() + u128::from(ledger.burned_fees()),
        u128::from(3 * LAMPORTS_PER_SOL)
    );
}
