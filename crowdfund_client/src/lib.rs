//! Async client for the crowdfund program.
//!
//! Every write takes the acting `Session` explicitly, builds and signs one
//! transaction and hands it to the ledger on the blocking pool. Reads decode
//! campaign accounts and fail closed on anything that is not a campaign.
//!
//! | Call             | Accounts in order         |
//! |------------------|---------------------------|
//! | create_campaign  | campaign (PDA), owner     |
//! | donate           | campaign, donor           |
//! | withdraw         | campaign, owner           |
//! | close_campaign   | campaign, owner           |

pub mod error;
pub mod session;

use std::sync::Arc;
use std::time::Duration;

use crowdfund_core::{
    CROWDFUND_PROGRAM_ID, Campaign, CrowdfundAccount, CrowdfundError, CrowdfundEvent, Instruction,
    find_campaign_address,
};
use ledger::{Ledger, Message, Transaction, TransactionReceipt, WitnessSet, account_id_from_key};
use ledger_core::{Account, AccountId, ProgramId};
use log::info;
use serde::Serialize;

pub use error::ClientError;
pub use session::Session;

/// A campaign as read at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CampaignSnapshot {
    pub address: AccountId,
    pub campaign: Campaign,
    /// Lamports held by the campaign account, rent included.
    pub balance: u64,
    /// Number of commits that changed the account.
    pub version: u64,
}

/// One accepted donation, as journaled by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Donation {
    pub donor: AccountId,
    pub amount: u64,
    /// Position in the campaign's donation history, from 1.
    pub sequence: u64,
    /// Campaign total right after this donation.
    pub amount_donated: u64,
    pub slot: u64,
    pub signature: String,
}

#[derive(Clone)]
pub struct CrowdfundClient {
    ledger: Arc<Ledger>,
    program_id: ProgramId,
    timeout: Option<Duration>,
}

impl CrowdfundClient {
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self {
            ledger,
            program_id: CROWDFUND_PROGRAM_ID,
            timeout: None,
        }
    }

    pub fn with_program_id(mut self, program_id: ProgramId) -> Self {
        self.program_id = program_id;
        self
    }

    /// Bound every call by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    pub fn program_id(&self) -> ProgramId {
        self.program_id
    }

    pub fn campaign_address(&self, owner: &AccountId, name: &str) -> Result<AccountId, ClientError> {
        Ok(find_campaign_address(&self.program_id, owner, name)?.0)
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    pub async fn create_campaign(
        &self,
        session: &Session,
        name: &str,
        description: &str,
    ) -> Result<(AccountId, TransactionReceipt), ClientError> {
        let address = self.campaign_address(&session.account_id(), name)?;
        let instruction = Instruction::CreateCampaign {
            name: name.to_string(),
            description: description.to_string(),
        };
        let receipt = self
            .send(session, vec![address, session.account_id()], instruction)
            .await?;
        info!("created campaign '{}' at {}", name, address);
        Ok((address, receipt))
    }

    pub async fn donate(
        &self,
        session: &Session,
        campaign: AccountId,
        amount: u64,
    ) -> Result<TransactionReceipt, ClientError> {
        self.send(
            session,
            vec![campaign, session.account_id()],
            Instruction::Donate { amount },
        )
        .await
    }

    pub async fn withdraw(
        &self,
        session: &Session,
        campaign: AccountId,
        amount: u64,
    ) -> Result<TransactionReceipt, ClientError> {
        self.send(
            session,
            vec![campaign, session.account_id()],
            Instruction::Withdraw { amount },
        )
        .await
    }

    pub async fn close_campaign(
        &self,
        session: &Session,
        campaign: AccountId,
    ) -> Result<TransactionReceipt, ClientError> {
        self.send(
            session,
            vec![campaign, session.account_id()],
            Instruction::CloseCampaign,
        )
        .await
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Fresh snapshot of an active campaign.
    pub async fn get_campaign(&self, address: AccountId) -> Result<CampaignSnapshot, ClientError> {
        let program_id = self.program_id;
        self.run(move |ledger| {
            let versioned = ledger
                .get_versioned_account(&address)
                .ok_or(CrowdfundError::AccountNotFound)?;
            let campaign = decode_owned(&program_id, &versioned.account)?.into_active()?;
            Ok(CampaignSnapshot {
                address,
                campaign,
                balance: versioned.account.lamports,
                version: versioned.version,
            })
        })
        .await
    }

    /// Every active campaign. Closed tombstones are skipped; any other
    /// account of the program that does not decode fails the whole call.
    pub async fn get_all_campaigns(&self) -> Result<Vec<CampaignSnapshot>, ClientError> {
        let program_id = self.program_id;
        self.run(move |ledger| {
            let mut campaigns = Vec::new();
            for (address, versioned) in ledger.get_program_accounts(&program_id) {
                match decode_owned(&program_id, &versioned.account)? {
                    CrowdfundAccount::Campaign(campaign) => campaigns.push(CampaignSnapshot {
                        address,
                        campaign,
                        balance: versioned.account.lamports,
                        version: versioned.version,
                    }),
                    CrowdfundAccount::Closed => {}
                }
            }
            Ok(campaigns)
        })
        .await
    }

    /// Donation history of a campaign, oldest first. Sequence numbers follow
    /// the journal's commit order.
    pub async fn donations(&self, campaign: AccountId) -> Result<Vec<Donation>, ClientError> {
        let program_id = self.program_id;
        self.run(move |ledger| {
            let mut donations = Vec::new();
            for record in ledger.events(&program_id) {
                if let CrowdfundEvent::DonationReceived {
                    campaign: target,
                    donor,
                    amount,
                    amount_donated,
                } = CrowdfundEvent::decode(&record.data)?
                {
                    if target == campaign {
                        donations.push(Donation {
                            donor,
                            amount,
                            sequence: donations.len() as u64 + 1,
                            amount_donated,
                            slot: record.slot,
                            signature: record.signature,
                        });
                    }
                }
            }
            Ok(donations)
        })
        .await
    }

    pub async fn balance(&self, account: AccountId) -> Result<u64, ClientError> {
        self.run(move |ledger| Ok(ledger.balance(&account))).await
    }

    // -----------------------------------------------------------------------
    // Plumbing
    // -----------------------------------------------------------------------

    async fn send(
        &self,
        session: &Session,
        account_ids: Vec<AccountId>,
        instruction: Instruction,
    ) -> Result<TransactionReceipt, ClientError> {
        let key = session.key().clone();
        let program_id = self.program_id;
        self.run(move |ledger| {
            let signer = account_id_from_key(&key);
            let nonces = vec![ledger.nonce(&signer)];
            let message = Message::try_new(program_id, account_ids, nonces, &instruction)?;
            let witness_set = WitnessSet::for_message(&message, &[&key])?;
            Ok(ledger.submit(&Transaction::new(message, witness_set))?)
        })
        .await
    }

    async fn run<T, F>(&self, f: F) -> Result<T, ClientError>
    where
        T: Send + 'static,
        F: FnOnce(&Ledger) -> Result<T, ClientError> + Send + 'static,
    {
        let ledger = Arc::clone(&self.ledger);
        let task = tokio::task::spawn_blocking(move || f(&ledger));
        let joined = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, task)
                .await
                .map_err(|_| ClientError::Timeout(limit))?,
            None => task.await,
        };
        joined.map_err(|e| ClientError::Task(e.to_string()))?
    }
}

fn decode_owned(program_id: &ProgramId, account: &Account) -> Result<CrowdfundAccount, CrowdfundError> {
    if !account.is_owned_by(program_id) {
        return Err(CrowdfundError::InvalidAccountData);
    }
    CrowdfundAccount::decode(&account.data)
}
