// error.rs - custom error codes of the crowdfund program.
//
// Codes start at 6000, the range on-chain programs conventionally reserve for
// their own errors. They are part of the wire contract: clients recover the
// variant from a `ProgramError` with `CrowdfundError::from_code`.

use ledger_core::ProgramError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[repr(u32)]
pub enum CrowdfundError {
    #[error("Unauthorized: caller lacks the required signature or ownership")]
    Unauthorized = 6000,
    #[error("Account not found")]
    AccountNotFound = 6001,
    #[error("Account already exists")]
    AccountAlreadyExists = 6002,
    #[error("Insufficient funds")]
    InsufficientFunds = 6003,
    #[error("Invalid input")]
    InvalidInput = 6004,
    #[error("Campaign address derivation failed")]
    AddressDerivationFailed = 6005,
    #[error("Campaign is closed")]
    CampaignClosed = 6006,
    #[error("Account data does not decode as a campaign")]
    InvalidAccountData = 6007,
    #[error("Amount overflow")]
    AmountOverflow = 6008,
}

impl CrowdfundError {
    pub const ALL: [CrowdfundError; 9] = [
        CrowdfundError::Unauthorized,
        CrowdfundError::AccountNotFound,
        CrowdfundError::AccountAlreadyExists,
        CrowdfundError::InsufficientFunds,
        CrowdfundError::InvalidInput,
        CrowdfundError::AddressDerivationFailed,
        CrowdfundError::CampaignClosed,
        CrowdfundError::InvalidAccountData,
        CrowdfundError::AmountOverflow,
    ];

    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.code() == code)
    }
}

impl From<CrowdfundError> for ProgramError {
    fn from(e: CrowdfundError) -> Self {
        ProgramError::custom(e.code(), e.to_string())
    }
}

impl TryFrom<&ProgramError> for CrowdfundError {
    type Error = ();

    fn try_from(e: &ProgramError) -> Result<Self, ()> {
        Self::from_code(e.code).ok_or(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(CrowdfundError::Unauthorized.code(), 6000);
        assert_eq!(CrowdfundError::InvalidInput.code(), 6004);
        assert_eq!(CrowdfundError::AmountOverflow.code(), 6008);
    }

    #[test]
    fn test_program_error_roundtrip() {
        for e in CrowdfundError::ALL {
            let program_error = ProgramError::from(e);
            assert_eq!(program_error.message, e.to_string());
            assert_eq!(CrowdfundError::try_from(&program_error), Ok(e));
        }
    }

    #[test]
    fn test_builtin_codes_are_not_crowdfund_errors() {
        let e = ProgramError::invalid_instruction_data("garbage");
        assert_eq!(CrowdfundError::try_from(&e), Err(()));
        assert_eq!(CrowdfundError::from_code(5999), None);
    }
}
