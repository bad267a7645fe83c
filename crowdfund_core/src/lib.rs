// crowdfund_core - shared types and campaign address helpers for the
// Crowdfund program.
//
//! Instruction enum, the campaign record and its discriminator-tagged codec,
//! events, error codes and address derivation. Used by the program handlers
//! and by off-chain tooling alike, so both sides agree on every byte.

pub mod error;

use borsh::{BorshDeserialize, BorshSerialize};
use ledger_core::{AccountId, AddressError, ProgramId, create_program_address, find_program_address};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub use error::CrowdfundError;

// ---------------------------------------------------------------------------
// Program identity and limits
// ---------------------------------------------------------------------------

const fn padded_tag(tag: &[u8]) -> [u8; 32] {
    let mut id = [0u8; 32];
    let mut i = 0;
    while i < tag.len() && i < 32 {
        id[i] = tag[i];
        i += 1;
    }
    id
}

/// Address the crowdfund program is registered under.
pub const CROWDFUND_PROGRAM_ID: ProgramId = AccountId::new(padded_tag(b"crowdfund_program"));

/// Campaign names double as address labels, so they share the seed limit.
pub const MAX_NAME_LEN: usize = 32;
pub const MAX_DESCRIPTION_LEN: usize = 256;

pub const CAMPAIGN_SEED: &[u8] = b"campaign";

// ---------------------------------------------------------------------------
// Instructions
// ---------------------------------------------------------------------------

/// Instructions the Crowdfund program understands.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub enum Instruction {
    /// Create a campaign owned by the signer.
    ///
    /// **Accounts:**
    /// 0. `campaign` - derived address for `(owner, name)`, must be unoccupied
    /// 1. `owner` - signer, pays the campaign's rent-exempt minimum
    CreateCampaign { name: String, description: String },

    /// Move lamports from the donor into a campaign.
    ///
    /// **Accounts:**
    /// 0. `campaign` - active campaign
    /// 1. `donor` - signer
    Donate { amount: u64 },

    /// Move donated lamports out to the campaign owner.
    ///
    /// **Accounts:**
    /// 0. `campaign` - active campaign
    /// 1. `owner` - signer, must be the campaign owner
    Withdraw { amount: u64 },

    /// Drain a campaign to its owner and leave a tombstone behind.
    ///
    /// **Accounts:**
    /// 0. `campaign` - active campaign
    /// 1. `owner` - signer, must be the campaign owner
    CloseCampaign,
}

// ---------------------------------------------------------------------------
// Campaign state
// ---------------------------------------------------------------------------

/// First 8 bytes of `sha256("account:<name>")`.
pub fn discriminator(type_name: &str) -> [u8; 8] {
    let digest = Sha256::digest(format!("account:{type_name}").as_bytes());
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}

pub fn campaign_discriminator() -> [u8; 8] {
    discriminator("Campaign")
}

/// Marks a closed campaign address.
pub const CLOSED_DISCRIMINATOR: [u8; 8] = [0xFF; 8];

/// State stored in each campaign account, after the discriminator.
///
/// Layout: `[disc:8][owner:32][name:4+n][description:4+d][amount_donated:8 LE]`.
/// Changing it breaks every campaign already on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Campaign {
    /// Creator; the only identity allowed to withdraw or close.
    pub owner: AccountId,
    pub name: String,
    pub description: String,
    /// Sum of every accepted donation. Withdrawals leave it alone.
    pub amount_donated: u64,
}

impl Campaign {
    pub fn new(owner: AccountId, name: String, description: String) -> Self {
        Self {
            owner,
            name,
            description,
            amount_donated: 0,
        }
    }

    /// Encoded size of a campaign with the given field lengths.
    pub fn space(name_len: usize, description_len: usize) -> usize {
        8 + 32 + 4 + name_len + 4 + description_len + 8
    }

    pub fn encoded_len(&self) -> usize {
        Self::space(self.name.len(), self.description.len())
    }

    pub fn encode(&self) -> Result<Vec<u8>, CrowdfundError> {
        let mut data = Vec::with_capacity(self.encoded_len());
        data.extend_from_slice(&campaign_discriminator());
        BorshSerialize::serialize(self, &mut data)
            .map_err(|_| CrowdfundError::InvalidAccountData)?;
        Ok(data)
    }

    /// Add an accepted donation to the running total.
    pub fn record_donation(&mut self, amount: u64) -> Result<u64, CrowdfundError> {
        self.amount_donated = self
            .amount_donated
            .checked_add(amount)
            .ok_or(CrowdfundError::AmountOverflow)?;
        Ok(self.amount_donated)
    }
}

/// Every record the program can leave at a campaign address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrowdfundAccount {
    Campaign(Campaign),
    Closed,
}

impl CrowdfundAccount {
    /// Decode account data. Unknown discriminators, short buffers and
    /// trailing bytes are all rejected.
    pub fn decode(data: &[u8]) -> Result<Self, CrowdfundError> {
        let (tag, body) = data
            .split_first_chunk::<8>()
            .ok_or(CrowdfundError::InvalidAccountData)?;
        if *tag == CLOSED_DISCRIMINATOR {
            return if body.is_empty() {
                Ok(Self::Closed)
            } else {
                Err(CrowdfundError::InvalidAccountData)
            };
        }
        if *tag != campaign_discriminator() {
            return Err(CrowdfundError::InvalidAccountData);
        }
        Campaign::try_from_slice(body)
            .map(Self::Campaign)
            .map_err(|_| CrowdfundError::InvalidAccountData)
    }

    /// The campaign if it is still active; `CampaignClosed` otherwise.
    pub fn into_active(self) -> Result<Campaign, CrowdfundError> {
        match self {
            Self::Campaign(campaign) => Ok(campaign),
            Self::Closed => Err(CrowdfundError::CampaignClosed),
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub enum CrowdfundEvent {
    CampaignCreated {
        campaign: AccountId,
        owner: AccountId,
        name: String,
    },
    DonationReceived {
        campaign: AccountId,
        donor: AccountId,
        amount: u64,
        amount_donated: u64,
    },
    Withdrawn {
        campaign: AccountId,
        owner: AccountId,
        amount: u64,
        remaining: u64,
    },
    CampaignClosed {
        campaign: AccountId,
        owner: AccountId,
        lamports: u64,
    },
}

impl CrowdfundEvent {
    pub fn decode(data: &[u8]) -> Result<Self, CrowdfundError> {
        Self::try_from_slice(data).map_err(|_| CrowdfundError::InvalidAccountData)
    }

    pub fn campaign(&self) -> &AccountId {
        match self {
            Self::CampaignCreated { campaign, .. }
            | Self::DonationReceived { campaign, .. }
            | Self::Withdrawn { campaign, .. }
            | Self::CampaignClosed { campaign, .. } => campaign,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation and address helpers
// ---------------------------------------------------------------------------

pub fn validate_campaign_fields(name: &str, description: &str) -> Result<(), CrowdfundError> {
    if name.is_empty() || name.len() > MAX_NAME_LEN || description.len() > MAX_DESCRIPTION_LEN {
        return Err(CrowdfundError::InvalidInput);
    }
    Ok(())
}

fn map_address_error(e: AddressError) -> CrowdfundError {
    match e {
        AddressError::MaxSeedLengthExceeded | AddressError::TooManySeeds => {
            CrowdfundError::InvalidInput
        }
        AddressError::OnCurve | AddressError::NoViableBump => {
            CrowdfundError::AddressDerivationFailed
        }
    }
}

/// Canonical campaign address and bump for `(owner, name)`.
pub fn find_campaign_address(
    program_id: &ProgramId,
    owner: &AccountId,
    name: &str,
) -> Result<(AccountId, u8), CrowdfundError> {
    find_program_address(&[CAMPAIGN_SEED, owner.as_ref(), name.as_bytes()], program_id)
        .map_err(map_address_error)
}

/// Recompute a campaign address from a known bump.
pub fn campaign_address_with_bump(
    program_id: &ProgramId,
    owner: &AccountId,
    name: &str,
    bump: u8,
) -> Result<AccountId, CrowdfundError> {
    create_program_address(
        &[CAMPAIGN_SEED, owner.as_ref(), name.as_bytes(), &[bump]],
        program_id,
    )
    .map_err(map_address_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> AccountId {
        AccountId::new([7u8; 32])
    }

    fn sample() -> Campaign {
        Campaign::new(owner(), "Save Africa".into(), "Wells and schools".into())
    }

    #[test]
    fn test_program_id_is_padded_tag() {
        assert_eq!(&CROWDFUND_PROGRAM_ID.value()[..17], b"crowdfund_program");
        assert!(CROWDFUND_PROGRAM_ID.value()[17..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_campaign_layout() {
        let campaign = sample();
        let data = campaign.encode().unwrap();

        assert_eq!(data.len(), campaign.encoded_len());
        assert_eq!(&data[..8], &campaign_discriminator());
        assert_eq!(&data[8..40], owner().value());
        assert_eq!(&data[40..44], &11u32.to_le_bytes());
        assert_eq!(&data[44..55], b"Save Africa");
        assert_eq!(&data[55..59], &17u32.to_le_bytes());
        assert_eq!(&data[59..76], b"Wells and schools");
        assert_eq!(data.len(), 76 + 8);
        assert_eq!(&data[76..], &0u64.to_le_bytes());
    }

    #[test]
    fn test_decode_roundtrip_and_closed_tombstone() {
        let campaign = sample();
        let data = campaign.encode().unwrap();
        assert_eq!(
            CrowdfundAccount::decode(&data),
            Ok(CrowdfundAccount::Campaign(campaign))
        );
        assert_eq!(
            CrowdfundAccount::decode(&CLOSED_DISCRIMINATOR),
            Ok(CrowdfundAccount::Closed)
        );
        assert_eq!(
            CrowdfundAccount::Closed.into_active(),
            Err(CrowdfundError::CampaignClosed)
        );
    }

    #[test]
    fn test_decode_fails_closed() {
        let mut data = sample().encode().unwrap();

        assert_eq!(
            CrowdfundAccount::decode(&data[..5]),
            Err(CrowdfundError::InvalidAccountData)
        );
        assert_eq!(
            CrowdfundAccount::decode(&data[..data.len() - 1]),
            Err(CrowdfundError::InvalidAccountData)
        );

        let mut trailing = data.clone();
        trailing.push(0);
        assert_eq!(
            CrowdfundAccount::decode(&trailing),
            Err(CrowdfundError::InvalidAccountData)
        );

        data[0] ^= 1;
        assert_eq!(
            CrowdfundAccount::decode(&data),
            Err(CrowdfundError::InvalidAccountData)
        );

        let mut closed_with_body = CLOSED_DISCRIMINATOR.to_vec();
        closed_with_body.push(1);
        assert_eq!(
            CrowdfundAccount::decode(&closed_with_body),
            Err(CrowdfundError::InvalidAccountData)
        );
    }

    #[test]
    fn test_discriminator_differs_per_type() {
        assert_ne!(discriminator("Campaign"), discriminator("Donation"));
        assert_ne!(campaign_discriminator(), CLOSED_DISCRIMINATOR);
    }

    #[test]
    fn test_record_donation_totals_and_overflows() {
        let mut campaign = sample();
        assert_eq!(campaign.record_donation(5), Ok(5));
        assert_eq!(campaign.record_donation(7), Ok(12));
        assert_eq!(&campaign.encode().unwrap()[76..], &12u64.to_le_bytes());

        campaign.amount_donated = u64::MAX;
        assert_eq!(
            campaign.record_donation(1),
            Err(CrowdfundError::AmountOverflow)
        );
    }

    #[test]
    fn test_field_limits() {
        assert!(validate_campaign_fields("a", "").is_ok());
        assert!(validate_campaign_fields(&"n".repeat(MAX_NAME_LEN), &"d".repeat(MAX_DESCRIPTION_LEN)).is_ok());
        assert_eq!(validate_campaign_fields("", "x"), Err(CrowdfundError::InvalidInput));
        assert_eq!(
            validate_campaign_fields(&"n".repeat(MAX_NAME_LEN + 1), ""),
            Err(CrowdfundError::InvalidInput)
        );
        assert_eq!(
            validate_campaign_fields("a", &"d".repeat(MAX_DESCRIPTION_LEN + 1)),
            Err(CrowdfundError::InvalidInput)
        );
    }

    #[test]
    fn test_campaign_address_is_deterministic() {
        let (a, bump_a) = find_campaign_address(&CROWDFUND_PROGRAM_ID, &owner(), "Save Africa").unwrap();
        let (b, bump_b) = find_campaign_address(&CROWDFUND_PROGRAM_ID, &owner(), "Save Africa").unwrap();
        assert_eq!((a, bump_a), (b, bump_b));
        assert_eq!(
            campaign_address_with_bump(&CROWDFUND_PROGRAM_ID, &owner(), "Save Africa", bump_a),
            Ok(a)
        );

        let (other, _) = find_campaign_address(&CROWDFUND_PROGRAM_ID, &owner(), "Save Asia").unwrap();
        assert_ne!(a, other);
        let (other_owner, _) =
            find_campaign_address(&CROWDFUND_PROGRAM_ID, &AccountId::new([8u8; 32]), "Save Africa").unwrap();
        assert_ne!(a, other_owner);
    }

    #[test]
    fn test_oversize_label_is_invalid_input() {
        let name = "n".repeat(MAX_NAME_LEN + 1);
        assert_eq!(
            find_campaign_address(&CROWDFUND_PROGRAM_ID, &owner(), &name),
            Err(CrowdfundError::InvalidInput)
        );
    }

    #[test]
    fn test_instruction_json_shape() {
        let json = serde_json::to_string(&Instruction::Donate { amount: 3 }).unwrap();
        assert_eq!(json, r#"{"Donate":{"amount":3}}"#);
    }
}
