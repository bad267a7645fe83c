use serde::{Deserialize, Serialize};

/// Bytes charged on top of the data length for every stored account.
pub const ACCOUNT_STORAGE_OVERHEAD: u64 = 128;

/// Storage cost schedule. An account holding at least
/// `minimum_balance(data_len)` lamports is exempt and never charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rent {
    pub lamports_per_byte_year: u64,
    pub exemption_threshold_years: u64,
}

impl Default for Rent {
    fn default() -> Self {
        Self {
            lamports_per_byte_year: 3480,
            exemption_threshold_years: 2,
        }
    }
}

impl Rent {
    pub fn minimum_balance(&self, data_len: usize) -> u64 {
        (ACCOUNT_STORAGE_OVERHEAD + data_len as u64)
            .saturating_mul(self.lamports_per_byte_year)
            .saturating_mul(self.exemption_threshold_years)
    }

    pub fn is_exempt(&self, lamports: u64, data_len: usize) -> bool {
        lamports >= self.minimum_balance(data_len)
    }
}
