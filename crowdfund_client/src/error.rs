use std::time::Duration;

use crowdfund_core::CrowdfundError;
use ledger::LedgerError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Rejected before anything was sent, or a read that found no usable campaign.
    #[error(transparent)]
    Crowdfund(#[from] CrowdfundError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    /// The call did not finish in time. A submission may still commit.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("ledger task failed: {0}")]
    Task(String),
}

impl ClientError {
    /// The crowdfund error this failure corresponds to, if any.
    ///
    /// Program rejections come back from the ledger as numeric codes; a fee
    /// payer that cannot cover the fee is reported as `InsufficientFunds`.
    pub fn crowdfund_error(&self) -> Option<CrowdfundError> {
        match self {
            Self::Crowdfund(e) => Some(*e),
            Self::Ledger(LedgerError::Program(e)) => CrowdfundError::from_code(e.code),
            Self::Ledger(LedgerError::InsufficientFundsForFee { .. }) => {
                Some(CrowdfundError::InsufficientFunds)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_core::{AccountId, ProgramError};

    #[test]
    fn test_program_rejection_maps_to_crowdfund_error() {
        let err = ClientError::from(LedgerError::Program(CrowdfundError::CampaignClosed.into()));
        assert_eq!(err.crowdfund_error(), Some(CrowdfundError::CampaignClosed));
    }

    #[test]
    fn test_fee_shortfall_is_insufficient_funds() {
        let err = ClientError::from(LedgerError::InsufficientFundsForFee {
            payer: AccountId::new([1u8; 32]),
            balance: 1,
            fee: 5000,
        });
        assert_eq!(err.crowdfund_error(), Some(CrowdfundError::InsufficientFunds));
    }

    #[test]
    fn test_unrelated_failures_have_no_crowdfund_error() {
        let err = ClientError::from(LedgerError::Program(ProgramError::invalid_instruction_data("x")));
        assert_eq!(err.crowdfund_error(), None);
        assert_eq!(ClientError::Timeout(Duration::from_secs(1)).crowdfund_error(), None);
    }
}
